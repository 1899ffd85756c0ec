use foundation::time::Month;

/// One step of the sequence being visualized.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Frame {
    /// A property name, e.g. `Pop_1990`.
    Attribute(String),
    Month(Month),
}

impl Frame {
    pub fn as_attribute(&self) -> Option<&str> {
        match self {
            Frame::Attribute(name) => Some(name),
            Frame::Month(_) => None,
        }
    }

    pub fn as_month(&self) -> Option<Month> {
        match self {
            Frame::Month(m) => Some(*m),
            Frame::Attribute(_) => None,
        }
    }

    /// Suffix after the first `_` of an attribute name (`Pop_1990` -> `1990`).
    pub fn attribute_suffix(&self) -> Option<&str> {
        self.as_attribute()?.split('_').nth(1)
    }

    /// Panel label for the frame.
    pub fn label(&self) -> String {
        match self {
            Frame::Month(m) => format!("Month: {}", m.name()),
            Frame::Attribute(name) => match self.attribute_suffix() {
                Some(suffix) => suffix.to_string(),
                None => name.clone(),
            },
        }
    }
}

/// Ordered frames of a dataset, fixed once computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSet {
    frames: Vec<Frame>,
}

impl FrameSet {
    pub fn months() -> Self {
        Self {
            frames: Month::all().map(Frame::Month).collect(),
        }
    }

    pub fn attributes<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            frames: names
                .into_iter()
                .map(|n| Frame::Attribute(n.into()))
                .collect(),
        }
    }

    /// Attribute frames for every property name containing `needle`,
    /// in the order the names are given.
    pub fn scan_attributes<'a>(names: impl IntoIterator<Item = &'a str>, needle: &str) -> Self {
        Self::attributes(names.into_iter().filter(|n| n.contains(needle)))
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Attribute names, skipping month frames.
    pub fn attribute_names(&self) -> Vec<&str> {
        self.frames.iter().filter_map(Frame::as_attribute).collect()
    }
}
