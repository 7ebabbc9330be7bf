pub trait Builder {
    type Build;
    fn build() -> Self::Build;
}

pub use self::address_record_builder::*;

pub mod address_record_builder {

    use super::*;
    use crate::address::*;

    #[derive(Debug)]
    pub struct AddressRecordBuild {
        addr: AddressRecord,
    }

    impl AddressRecordBuild {
        pub fn street(mut self, x: &str) -> Self {
            self.addr.street = Some(x.into());
            self
        }
        pub fn house_number(mut self, x: &str) -> Self {
            self.addr.house_number = Some(x.into());
            self
        }
        pub fn house_number_suffix(mut self, x: &str) -> Self {
            self.addr.house_number_suffix = Some(x.into());
            self
        }
        pub fn postal_code(mut self, x: &str) -> Self {
            self.addr.postal_code = Some(x.into());
            self
        }
        pub fn city(mut self, x: &str) -> Self {
            self.addr.city = Some(x.into());
            self
        }
        pub fn state(mut self, x: &str) -> Self {
            self.addr.state = Some(x.into());
            self
        }
        pub fn country(mut self, x: &str) -> Self {
            self.addr.country = Some(x.into());
            self
        }
        pub fn finish(self) -> AddressRecord {
            self.addr
        }
    }

    impl Builder for AddressRecord {
        type Build = AddressRecordBuild;
        fn build() -> Self::Build {
            AddressRecordBuild {
                addr: AddressRecord::default(),
            }
        }
    }

    #[test]
    fn empty_address_record() {
        assert!(AddressRecord::default().is_empty());
        assert!(!AddressRecord::build().street("x").finish().is_empty());
        assert!(!AddressRecord::build().house_number("1").finish().is_empty());
        assert!(!AddressRecord::build().postal_code("x").finish().is_empty());
        assert!(!AddressRecord::build().city("x").finish().is_empty());
        assert!(!AddressRecord::build().state("x").finish().is_empty());
        assert!(!AddressRecord::build().country("x").finish().is_empty());
    }
}
