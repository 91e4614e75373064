//! Customer and destination value objects.
//!
//! Both are validated on construction and immutable afterwards. The provider
//! only accepts two address lines; a third line is kept on the value but never
//! put on the wire.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ValidationError;

static REGION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w \-+]+$").expect("invalid region regex pattern"));

static POSTAL_CODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w +]+$").expect("invalid postal code regex pattern"));

pub const MAX_ADDRESS_LINES: usize = 3;
pub const MAX_ADDRESS_LINE_LEN: usize = 127;

fn check_len(field: &str, value: &str, min: usize, max: usize) -> Result<(), ValidationError> {
    let n = value.chars().count();
    if n < min {
        return Err(ValidationError::new(
            field,
            format!("must be at least {min} characters"),
        ));
    }
    if n > max {
        return Err(ValidationError::new(
            field,
            format!("must be at most {max} characters"),
        ));
    }
    Ok(())
}

fn check_pattern(field: &str, value: &str, pattern: &Regex) -> Result<(), ValidationError> {
    if pattern.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::new(field, "contains unsupported characters"))
    }
}

// ---------------------------------------------------------------------------
// Destination
// ---------------------------------------------------------------------------

/// Where an order ships to. This is all the provider needs to quote shipping.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Destination {
    country: String,
    state_province: String,
    postal_code: String,
}

impl Destination {
    /// `country` is full text (e.g. `"United States"`), not url-encoded.
    pub fn new(
        country: impl Into<String>,
        state_province: impl Into<String>,
        postal_code: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let country = country.into();
        let state_province = state_province.into();
        let postal_code = postal_code.into();

        check_len("country", &country, 2, 64)?;
        check_pattern("country", &country, &REGION_PATTERN)?;
        check_len("state_province", &state_province, 2, 64)?;
        check_pattern("state_province", &state_province, &REGION_PATTERN)?;
        check_len("postal_code", &postal_code, 2, 64)?;
        check_pattern("postal_code", &postal_code, &POSTAL_CODE_PATTERN)?;

        Ok(Self {
            country,
            state_province,
            postal_code,
        })
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn state_province(&self) -> &str {
        &self.state_province
    }

    pub fn postal_code(&self) -> &str {
        &self.postal_code
    }
}

// ---------------------------------------------------------------------------
// Customer
// ---------------------------------------------------------------------------

/// The person (and optionally company) an order ships to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Customer {
    name: String,
    company: Option<String>,
    address: Vec<String>,
    city: String,
}

impl Customer {
    /// An empty `company` is treated as absent.
    pub fn new<S: AsRef<str>>(
        name: impl Into<String>,
        company: Option<&str>,
        address: &[S],
        city: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        let city = city.into();
        let company = company.filter(|c| !c.is_empty()).map(str::to_string);
        let address: Vec<String> = address.iter().map(|l| l.as_ref().to_string()).collect();

        check_len("name", &name, 2, 128)?;
        if let Some(c) = &company {
            check_len("company", c, 1, 128)?;
        }
        if address.is_empty() || address.len() > MAX_ADDRESS_LINES {
            return Err(ValidationError::new(
                "address",
                format!("must have between 1 and {MAX_ADDRESS_LINES} lines"),
            ));
        }
        check_len("address", &address[0], 1, MAX_ADDRESS_LINE_LEN)?;
        for line in &address[1..] {
            check_len("address", line, 0, MAX_ADDRESS_LINE_LEN)?;
        }
        check_len("city", &city, 1, 128)?;

        Ok(Self {
            name,
            company,
            address,
            city,
        })
    }

    /// Same as [`Customer::new`], taking the address as one newline-separated block.
    pub fn with_address_block(
        name: impl Into<String>,
        company: Option<&str>,
        address: &str,
        city: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let lines: Vec<&str> = address.split('\n').collect();
        Self::new(name, company, &lines, city)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn company(&self) -> Option<&str> {
        self.company.as_deref()
    }

    pub fn address(&self) -> &[String] {
        &self.address
    }

    pub fn city(&self) -> &str {
        &self.city
    }
}
