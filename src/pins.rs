/// Pin export tables.
///
/// Each board exposes a static name → object table that the runtime's
/// attribute lookup consults when user code asks for a board pin by name.
/// Tables are `static` slices: built at compile time, never mutated.
/// The physical pins themselves belong to the platform's pin registry;
/// [`PinRef`] only refers to them.
use core::fmt;

/// Handle to a physical GPIO line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PinRef(u8);

impl PinRef {
    pub const fn gpio(number: u8) -> Self {
        Self(number)
    }

    pub const fn number(self) -> u8 {
        self.0
    }
}

impl fmt::Display for PinRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GPIO{}", self.0)
    }
}

/// What a board table name resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardObject {
    /// A GPIO line
    Pin(PinRef),
    /// The board identifier string
    BoardId(&'static str),
    /// The board's default I2C bus
    I2c,
    /// The board's default UART
    Uart,
    /// A display from the platform pool, by slot index. Static tables
    /// list the board's first display; `Board::resolve` substitutes the
    /// slot `init` constructed.
    Display(u8),
}

impl BoardObject {
    pub fn as_pin(&self) -> Option<PinRef> {
        match *self {
            BoardObject::Pin(pin) => Some(pin),
            _ => None,
        }
    }

    /// Short lowercase tag, as reported to the host.
    pub fn kind(&self) -> &'static str {
        match self {
            BoardObject::Pin(_) => "pin",
            BoardObject::BoardId(_) => "board_id",
            BoardObject::I2c => "i2c",
            BoardObject::Uart => "uart",
            BoardObject::Display(_) => "display",
        }
    }
}

/// Problems found by [`PinTable::audit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableError {
    /// The same name appears twice.
    DuplicateName(&'static str),
    /// Two names refer to the same pin without being listed as aliases.
    UndocumentedAlias {
        first: &'static str,
        second: &'static str,
        pin: PinRef,
    },
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::DuplicateName(name) => write!(f, "duplicate pin name {}", name),
            TableError::UndocumentedAlias { first, second, pin } => {
                write!(f, "{} and {} both map to {}", first, second, pin)
            }
        }
    }
}

/// Static name → [`BoardObject`] table.
pub struct PinTable {
    entries: &'static [(&'static str, BoardObject)],
    /// Name pairs that deliberately share one pin (e.g. a function name and
    /// its GPIO name).
    aliases: &'static [(&'static str, &'static str)],
}

impl PinTable {
    pub const fn new(
        entries: &'static [(&'static str, BoardObject)],
        aliases: &'static [(&'static str, &'static str)],
    ) -> Self {
        Self { entries, aliases }
    }

    /// Resolve a name. Lookup is exact and case-sensitive; a miss is `None`
    /// and the caller decides what that means.
    pub fn lookup(&self, name: &str) -> Option<BoardObject> {
        self.entries
            .iter()
            .find(|(entry, _)| *entry == name)
            .map(|&(_, object)| object)
    }

    /// Resolve a name that must be a GPIO line.
    pub fn pin(&self, name: &str) -> Option<PinRef> {
        self.lookup(name).and_then(|object| object.as_pin())
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        self.entries.iter().map(|&(name, _)| name)
    }

    /// All (name, pin) entries, skipping non-pin objects.
    pub fn pins(&self) -> impl Iterator<Item = (&'static str, PinRef)> {
        self.entries
            .iter()
            .filter_map(|&(name, object)| object.as_pin().map(|pin| (name, pin)))
    }

    /// Every name that maps to `pin`.
    pub fn names_for(&self, pin: PinRef) -> impl Iterator<Item = &'static str> {
        self.pins()
            .filter(move |&(_, p)| p == pin)
            .map(|(name, _)| name)
    }

    pub fn aliases(&self) -> &'static [(&'static str, &'static str)] {
        self.aliases
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn is_documented_alias(&self, a: &str, b: &str) -> bool {
        self.aliases
            .iter()
            .any(|&(x, y)| (x == a && y == b) || (x == b && y == a))
    }

    /// Check that names are unique and that any two names sharing a pin
    /// are listed in the alias table.
    pub fn audit(&self) -> Result<(), TableError> {
        for (i, &(name, object)) in self.entries.iter().enumerate() {
            for &(other, other_object) in &self.entries[i + 1..] {
                if name == other {
                    return Err(TableError::DuplicateName(name));
                }
                if let (BoardObject::Pin(pin), BoardObject::Pin(other_pin)) = (object, other_object) {
                    if pin == other_pin && !self.is_documented_alias(name, other) {
                        return Err(TableError::UndocumentedAlias {
                            first: name,
                            second: other,
                            pin,
                        });
                    }
                }
            }
        }
        Ok(())
    }
}
