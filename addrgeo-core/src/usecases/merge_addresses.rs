use crate::{entities::*, normalize, FormatError};

/// One input row: either separate address fields or an already merged line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressInput {
    Structured(AddressRecord),
    Merged(String),
}

impl From<AddressRecord> for AddressInput {
    fn from(from: AddressRecord) -> Self {
        Self::Structured(from)
    }
}

impl From<String> for AddressInput {
    fn from(from: String) -> Self {
        Self::Merged(from)
    }
}

pub fn merge_address(input: &AddressInput) -> Result<CanonicalAddress, FormatError> {
    match input {
        AddressInput::Structured(addr) => normalize::canonicalize(addr),
        AddressInput::Merged(line) => Ok(normalize::canonicalize_merged(line)),
    }
}

/// Normalizes every input independently, keeping the input order.
pub fn merge_addresses(inputs: &[AddressInput]) -> Vec<Result<CanonicalAddress, FormatError>> {
    inputs.iter().map(merge_address).collect()
}
