/// An operation a registry entry can declare support for.
///
/// Owners reserving an expected dynamic entry state which of these the loaded
/// entry has to provide; the check is structural (declared capabilities) rather
/// than tied to a concrete Rust type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
	/// Renders a user-visible name and description.
	Display,
	/// Contributes extra tooltip lines.
	Tooltip,
	/// Accepts a level and scales its effect with it.
	Leveled,
	/// Exposes behavior hooks to the host.
	Hooks,
	/// Stores persistent data on the object it is applied to.
	PersistentData,
	/// Gates its effect behind runtime conditions.
	Conditional,
}

bitflags::bitflags! {
	/// A set of entry capabilities.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct CapabilitySet: u32 {
		/// Renders a user-visible name and description.
		const DISPLAY = 1 << 0;
		/// Contributes extra tooltip lines.
		const TOOLTIP = 1 << 1;
		/// Accepts a level.
		const LEVELED = 1 << 2;
		/// Exposes behavior hooks.
		const HOOKS = 1 << 3;
		/// Stores persistent data.
		const PERSISTENT_DATA = 1 << 4;
		/// Gated behind runtime conditions.
		const CONDITIONAL = 1 << 5;
	}
}

impl Capability {
	/// Returns the bitflag for this capability.
	pub const fn as_set(self) -> CapabilitySet {
		match self {
			Self::Display => CapabilitySet::DISPLAY,
			Self::Tooltip => CapabilitySet::TOOLTIP,
			Self::Leveled => CapabilitySet::LEVELED,
			Self::Hooks => CapabilitySet::HOOKS,
			Self::PersistentData => CapabilitySet::PERSISTENT_DATA,
			Self::Conditional => CapabilitySet::CONDITIONAL,
		}
	}
}

impl CapabilitySet {
	/// Returns the capabilities in `required` that this set does not provide.
	pub fn missing(self, required: CapabilitySet) -> CapabilitySet {
		required.difference(self)
	}

	/// Returns true if every capability in `required` is provided.
	pub fn satisfies(self, required: CapabilitySet) -> bool {
		self.contains(required)
	}
}

impl From<Capability> for CapabilitySet {
	fn from(cap: Capability) -> Self {
		cap.as_set()
	}
}

impl FromIterator<Capability> for CapabilitySet {
	fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
		let mut set = CapabilitySet::empty();
		for cap in iter {
			set |= cap.as_set();
		}
		set
	}
}
