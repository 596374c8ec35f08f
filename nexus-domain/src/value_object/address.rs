use super::{ValueObject, digits_only};
use crate::error::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::fmt;

const POSTAL_CODE_LEN: usize = 8;

/// 结构化地址
///
/// 街道、城市、州、邮编为必填；邮编只保留数字且必须为 8 位；州统一大写；
/// 所有字段去除首尾空白，空的可选字段视为缺省。
///
/// ```
/// use nexus_domain::value_object::Address;
///
/// let address = Address::builder()
///     .street("Av. Paulista")
///     .number("1000")
///     .city("São Paulo")
///     .state("sp")
///     .postal_code("01310-100")
///     .build()
///     .unwrap();
///
/// assert_eq!(address.state(), "SP");
/// assert_eq!(address.formatted_postal_code(), "01310-100");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "AddressRepr")]
pub struct Address {
    street: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    complement: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    district: Option<String>,
    city: String,
    state: String,
    postal_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    country: Option<String>,
}

#[derive(Deserialize)]
struct AddressRepr {
    street: String,
    number: Option<String>,
    complement: Option<String>,
    district: Option<String>,
    city: String,
    state: String,
    postal_code: String,
    country: Option<String>,
}

fn required(field: &str, value: &str) -> DomainResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DomainError::validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[bon::bon]
impl Address {
    #[builder]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        #[builder(into)] street: String,
        #[builder(into)] number: Option<String>,
        #[builder(into)] complement: Option<String>,
        #[builder(into)] district: Option<String>,
        #[builder(into)] city: String,
        #[builder(into)] state: String,
        #[builder(into)] postal_code: String,
        #[builder(into)] country: Option<String>,
    ) -> DomainResult<Self> {
        let street = required("street", &street)?;
        let city = required("city", &city)?;
        let state = required("state", &state)?.to_uppercase();
        let raw_postal_code = required("postal_code", &postal_code)?;

        let postal_code = digits_only(&raw_postal_code);
        if postal_code.len() != POSTAL_CODE_LEN {
            return Err(DomainError::validation("invalid postal code format"));
        }

        Ok(Self {
            street,
            number: optional(number),
            complement: optional(complement),
            district: optional(district),
            city,
            state,
            postal_code,
            country: optional(country),
        })
    }
}

impl Address {
    pub fn street(&self) -> &str {
        &self.street
    }

    pub fn number(&self) -> Option<&str> {
        self.number.as_deref()
    }

    pub fn complement(&self) -> Option<&str> {
        self.complement.as_deref()
    }

    pub fn district(&self) -> Option<&str> {
        self.district.as_deref()
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn postal_code(&self) -> &str {
        &self.postal_code
    }

    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    /// `NNNNN-NNN`
    pub fn formatted_postal_code(&self) -> String {
        format!("{}-{}", &self.postal_code[..5], &self.postal_code[5..])
    }

    /// 以逗号连接的单行地址，缺省的可选字段被跳过
    pub fn full_address(&self) -> String {
        let mut parts: Vec<String> = vec![self.street.clone()];
        parts.extend(self.number.iter().cloned());
        parts.extend(self.complement.iter().cloned());
        parts.extend(self.district.iter().cloned());
        parts.push(self.city.clone());
        parts.push(self.state.clone());
        parts.push(self.formatted_postal_code());
        parts.extend(self.country.iter().cloned());
        parts.join(", ")
    }
}

impl ValueObject for Address {
    fn validate(&self) -> DomainResult<()> {
        Address::builder()
            .street(self.street.clone())
            .maybe_number(self.number.clone())
            .maybe_complement(self.complement.clone())
            .maybe_district(self.district.clone())
            .city(self.city.clone())
            .state(self.state.clone())
            .postal_code(self.postal_code.clone())
            .maybe_country(self.country.clone())
            .build()
            .map(|_| ())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_address())
    }
}

impl TryFrom<AddressRepr> for Address {
    type Error = DomainError;

    fn try_from(value: AddressRepr) -> Result<Self, Self::Error> {
        Address::builder()
            .street(value.street)
            .maybe_number(value.number)
            .maybe_complement(value.complement)
            .maybe_district(value.district)
            .city(value.city)
            .state(value.state)
            .postal_code(value.postal_code)
            .maybe_country(value.country)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Address {
        Address::builder()
            .street(" Rua das Flores ")
            .number("42")
            .complement("")
            .district("Centro")
            .city("Curitiba")
            .state("pr")
            .postal_code("80010-000")
            .country("Brasil")
            .build()
            .unwrap()
    }

    #[test]
    fn normalizes_fields() {
        let a = sample();
        assert_eq!(a.street(), "Rua das Flores");
        assert_eq!(a.state(), "PR");
        assert_eq!(a.postal_code(), "80010000");
        assert_eq!(a.complement(), None);
        assert_eq!(a.formatted_postal_code(), "80010-000");
    }

    #[test]
    fn full_address_skips_missing_parts() {
        assert_eq!(
            sample().full_address(),
            "Rua das Flores, 42, Centro, Curitiba, PR, 80010-000, Brasil"
        );

        let minimal = Address::builder()
            .street("Rua A")
            .city("Recife")
            .state("PE")
            .postal_code("50000000")
            .build()
            .unwrap();
        assert_eq!(minimal.to_string(), "Rua A, Recife, PE, 50000-000");
    }

    #[test]
    fn requires_mandatory_fields_and_eight_digit_postal_code() {
        let missing_city = Address::builder()
            .street("Rua A")
            .city("  ")
            .state("PE")
            .postal_code("50000000")
            .build();
        assert!(missing_city.is_err());

        let short_zip = Address::builder()
            .street("Rua A")
            .city("Recife")
            .state("PE")
            .postal_code("5000-000")
            .build();
        assert!(short_zip.is_err());
    }

    #[test]
    fn serde_round_trip_revalidates() {
        let a = sample();
        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(serde_json::from_str::<Address>(&json).unwrap(), a);

        let bad = r#"{"street":"Rua A","city":"Recife","state":"PE","postal_code":"123"}"#;
        assert!(serde_json::from_str::<Address>(bad).is_err());
    }
}
