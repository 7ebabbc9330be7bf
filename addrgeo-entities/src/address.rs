/// A structured postal address as it arrives from a tabular source.
///
/// Every field is optional. Numeric fields are kept as text because
/// spreadsheets tend to hand them over as floats (`"12.0"`) and postal
/// codes must never lose their leading zeros.
#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AddressRecord {
    pub street              : Option<String>,
    pub house_number        : Option<String>,
    pub house_number_suffix : Option<String>,
    pub postal_code         : Option<String>,
    pub city                : Option<String>,
    pub state               : Option<String>,
    pub country             : Option<String>,
}

impl AddressRecord {
    pub fn is_empty(&self) -> bool {
        let Self {
            street,
            house_number,
            house_number_suffix,
            postal_code,
            city,
            state,
            country,
        } = self;
        [
            street,
            house_number,
            house_number_suffix,
            postal_code,
            city,
            state,
            country,
        ]
        .into_iter()
        .all(|x| x.as_deref().map(str::trim).unwrap_or_default().is_empty())
    }
}
