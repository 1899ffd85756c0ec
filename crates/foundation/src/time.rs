/// Time primitives
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Calendar month, 1-based (January = 1).
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month(u8);

impl Month {
    pub const JANUARY: Month = Month(1);
    pub const DECEMBER: Month = Month(12);

    pub fn new(number: u32) -> Option<Self> {
        if (1..=12).contains(&number) {
            Some(Self(number as u8))
        } else {
            None
        }
    }

    /// All twelve months in calendar order.
    pub fn all() -> impl Iterator<Item = Month> {
        (1..=12u8).map(Month)
    }

    pub fn number(self) -> u32 {
        self.0 as u32
    }

    /// 0-based position in the year (January = 0).
    pub fn ordinal0(self) -> usize {
        (self.0 - 1) as usize
    }

    pub fn from_ordinal0(ordinal: usize) -> Option<Self> {
        Self::new(u32::try_from(ordinal).ok()?.checked_add(1)?)
    }

    pub fn name(self) -> &'static str {
        MONTH_NAMES[self.ordinal0()]
    }
}

impl std::fmt::Display for Month {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
