use super::ids::{XsId, XsIdError};

/// Burnup-group code given to blocks that have not been binned yet.
pub const DEFAULT_BU_GROUP: char = 'A';

/// An axial region of an assembly, the unit that cross sections are generated for.
///
/// Only the attributes the cross-section protocol reads are modelled: the type code
/// and burnup group that form the block's XS ID, and its burnup.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub name: String,
    /// Cross-section type code, e.g. `"A"`.
    pub xs_type: String,
    /// Burnup-group code assigned by the grouping step.
    pub bu_group: char,
    /// Burnup in percent FIMA.
    pub percent_bu: f64,
    /// Burnup gained per time node in percent FIMA.
    pub burnup_rate: f64,
}

impl Block {
    pub fn new(name: &str, xs_type: &str) -> Self {
        Self {
            name: name.to_string(),
            xs_type: xs_type.to_string(),
            bu_group: DEFAULT_BU_GROUP,
            percent_bu: 0.0,
            burnup_rate: 0.0,
        }
    }

    pub fn with_burnup(mut self, percent_bu: f64) -> Self {
        self.percent_bu = percent_bu;
        self
    }

    pub fn with_burnup_rate(mut self, rate: f64) -> Self {
        self.burnup_rate = rate;
        self
    }

    /// The cross-section identifier this block currently maps to.
    pub fn xs_id(&self) -> Result<XsId, XsIdError> {
        XsId::from_parts(&self.xs_type, self.bu_group)
    }

    pub(crate) fn advance_burnup(&mut self) {
        self.percent_bu += self.burnup_rate;
    }
}
