use cpe::{
    cpe::{Cpe as _, CpeType, Language},
    component::Component,
    uri::OwnedUri,
};
use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

/// The attribute tuple identifying a platform or product.
///
/// Version and update are intentionally absent: version applicability is
/// carried by the affected-package documents, not by the catalog tuple. An
/// empty attribute is a wildcard.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CpeAttributes {
    pub part: String,
    pub vendor: String,
    pub product: String,
    pub edition: String,
    pub language: String,
    pub software_edition: String,
    pub target_hardware: String,
    pub target_software: String,
    pub other: String,
}

/// `true` for the values that stand for "any" in a CPE attribute.
pub fn is_wildcard(attribute: &str) -> bool {
    attribute.is_empty() || attribute == "*"
}

fn normalize_attribute(value: &str) -> String {
    if is_wildcard(value) {
        String::new()
    } else {
        value.to_lowercase()
    }
}

fn attribute_matches(stored: &str, specifier: &str, allow_broad: bool) -> bool {
    if is_wildcard(specifier) {
        return true;
    }
    if is_wildcard(stored) {
        // a wildcard on the stored side only satisfies a concrete specifier
        // attribute when broad matching is requested
        return allow_broad;
    }
    stored.eq_ignore_ascii_case(specifier)
}

impl CpeAttributes {
    /// Lowercase every attribute and canonicalize `*` to the empty string.
    pub fn normalize(&self) -> Self {
        Self {
            part: normalize_attribute(&self.part),
            vendor: normalize_attribute(&self.vendor),
            product: normalize_attribute(&self.product),
            edition: normalize_attribute(&self.edition),
            language: normalize_attribute(&self.language),
            software_edition: normalize_attribute(&self.software_edition),
            target_hardware: normalize_attribute(&self.target_hardware),
            target_software: normalize_attribute(&self.target_software),
            other: normalize_attribute(&self.other),
        }
    }

    /// Does this (stored) tuple satisfy the given specifier tuple?
    ///
    /// Evaluated attribute by attribute: a wildcard specifier attribute
    /// matches anything, a concrete one requires equality, and a wildcard on
    /// the stored side matches a concrete specifier attribute only when
    /// `allow_broad` is set.
    pub fn matches(&self, specifier: &CpeAttributes, allow_broad: bool) -> bool {
        attribute_matches(&self.part, &specifier.part, allow_broad)
            && attribute_matches(&self.vendor, &specifier.vendor, allow_broad)
            && attribute_matches(&self.product, &specifier.product, allow_broad)
            && attribute_matches(&self.edition, &specifier.edition, allow_broad)
            && attribute_matches(&self.language, &specifier.language, allow_broad)
            && attribute_matches(
                &self.software_edition,
                &specifier.software_edition,
                allow_broad,
            )
            && attribute_matches(
                &self.target_hardware,
                &specifier.target_hardware,
                allow_broad,
            )
            && attribute_matches(
                &self.target_software,
                &specifier.target_software,
                allow_broad,
            )
            && attribute_matches(&self.other, &specifier.other, allow_broad)
    }
}

fn component(value: Component<'_>) -> String {
    match value {
        Component::Any => String::new(),
        Component::NotApplicable => "-".to_string(),
        Component::Value(inner) => inner.to_string(),
    }
}

impl From<&OwnedUri> for CpeAttributes {
    fn from(uri: &OwnedUri) -> Self {
        Self {
            part: match uri.part() {
                CpeType::Any => String::new(),
                CpeType::Hardware => "h".to_string(),
                CpeType::OperatingSystem => "o".to_string(),
                CpeType::Application => "a".to_string(),
                CpeType::Empty => String::new(),
            },
            vendor: component(uri.vendor()),
            product: component(uri.product()),
            edition: component(uri.edition()),
            language: match uri.language() {
                Language::Any => String::new(),
                Language::Language(lang) => lang.as_str().to_string(),
            },
            software_edition: component(uri.sw_edition()),
            target_hardware: component(uri.target_hw()),
            target_software: component(uri.target_sw()),
            other: component(uri.other()),
        }
        .normalize()
    }
}

impl FromStr for CpeAttributes {
    type Err = <OwnedUri as FromStr>::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok((&OwnedUri::from_str(s)?).into())
    }
}

impl Display for CpeAttributes {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        fn bind(value: &str) -> &str {
            if value.is_empty() {
                "*"
            } else {
                value
            }
        }

        write!(
            f,
            "cpe:2.3:{}:{}:{}:*:*:{}:{}:{}:{}:{}:{}",
            bind(&self.part),
            bind(&self.vendor),
            bind(&self.product),
            bind(&self.edition),
            bind(&self.language),
            bind(&self.software_edition),
            bind(&self.target_software),
            bind(&self.target_hardware),
            bind(&self.other),
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn attrs(part: &str, vendor: &str, product: &str, target_software: &str) -> CpeAttributes {
        CpeAttributes {
            part: part.into(),
            vendor: vendor.into(),
            product: product.into(),
            target_software: target_software.into(),
            ..Default::default()
        }
    }

    #[test]
    fn normalize_lowercases_and_collapses_wildcards() {
        let normalized = CpeAttributes {
            part: "a".into(),
            vendor: "Vendor1".into(),
            product: "Product1".into(),
            target_software: "*".into(),
            ..Default::default()
        }
        .normalize();

        assert_eq!(normalized, attrs("a", "vendor1", "product1", ""));
    }

    #[test]
    fn concrete_specifier_requires_equality() {
        let stored = attrs("a", "vendor1", "product1", "");

        assert!(stored.matches(&attrs("a", "vendor1", "product1", ""), false));
        assert!(stored.matches(&attrs("a", "VENDOR1", "*", ""), false));
        assert!(!stored.matches(&attrs("a", "vendor2", "product1", ""), false));
    }

    #[test]
    fn stored_wildcard_needs_broad_matching() {
        let stored = attrs("a", "vendor2", "product2", "");

        assert!(!stored.matches(&attrs("a", "vendor2", "*", "target1"), false));
        assert!(stored.matches(&attrs("a", "vendor2", "*", "target1"), true));
    }

    #[test]
    fn parse_uri() {
        let attrs = CpeAttributes::from_str("cpe:/a:Vendor1:Product1:1.2.3").expect("must parse");

        assert_eq!(attrs.part, "a");
        assert_eq!(attrs.vendor, "vendor1");
        assert_eq!(attrs.product, "product1");
        // version is not part of the catalog tuple
        assert!(is_wildcard(&attrs.target_software));
        assert!(is_wildcard(&attrs.target_hardware));
    }
}
