use nexus_domain::error::{DomainError, DomainResult};
use nexus_domain::value_object::ValueObject;
use nexus_macros::value_object;

#[value_object(validate = Dimensions::check)]
struct Dimensions {
    width: u32,
    height: u32,
}

impl Dimensions {
    fn check(&self) -> DomainResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(DomainError::validation("dimensions must be positive"));
        }
        Ok(())
    }
}

#[value_object]
#[derive(Copy)]
enum Unit {
    Metric,
    Imperial,
}

#[value_object(debug = false)]
struct Secret(String);

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret(..)")
    }
}

fn main() {
    let d = Dimensions { width: 2, height: 3 };
    assert!(d.validate().is_ok());
    assert!(Dimensions { width: 0, height: 1 }.validate().is_err());
    assert_eq!(d.clone(), d);

    let u = Unit::Metric;
    let copied = u;
    assert_eq!(u, copied);
    assert!(Unit::Imperial.validate().is_ok());

    let s = Secret("hunter2".into());
    assert_eq!(format!("{s:?}"), "Secret(..)");
    let json = serde_json::to_string(&s).unwrap();
    assert_eq!(json, "\"hunter2\"");
}
