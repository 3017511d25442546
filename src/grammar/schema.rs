// Copyright (c) 2016-2021 Fabian Schuiki

//! Attribute schemas synthesized from named matches.
//!
//! A rule that uses named matches (`name=Symbol`) yields a `PgClass` that
//! describes the record a parse of that rule produces. The record itself is a
//! `PgObject`, a generic container checked against the class.

use crate::production::Multiplicity;
use pargram_common::{GrammarError, GrammarResult};
use std::collections::BTreeMap;
use std::fmt;

/// One attribute of a rule's result record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PgAttribute {
    pub name: String,
    pub multiplicity: Multiplicity,
    /// The name of the rule matched by the attribute.
    pub type_name: String,
}

impl PgAttribute {
    pub fn new<S: Into<String>, T: Into<String>>(
        name: S,
        multiplicity: Multiplicity,
        type_name: T,
    ) -> PgAttribute {
        PgAttribute {
            name: name.into(),
            multiplicity,
            type_name: type_name.into(),
        }
    }
}

impl fmt::Display for PgAttribute {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {} [{}]", self.name, self.type_name, self.multiplicity)
    }
}

/// The schema of the result record of a rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PgClass {
    pub name: String,
    pub attrs: BTreeMap<String, PgAttribute>,
}

impl PgClass {
    pub fn new<S: Into<String>>(name: S) -> PgClass {
        PgClass {
            name: name.into(),
            attrs: BTreeMap::new(),
        }
    }

    /// Merge the attributes of another definition of the same rule. Later
    /// attributes replace earlier ones of the same name.
    pub fn merge<I: IntoIterator<Item = PgAttribute>>(&mut self, attrs: I) {
        for attr in attrs {
            self.attrs.insert(attr.name.clone(), attr);
        }
    }

    pub fn attr(&self, name: &str) -> Option<&PgAttribute> {
        self.attrs.get(name)
    }

    /// Create a record of this class from attribute values.
    pub fn instantiate<V, I>(&self, values: I) -> GrammarResult<PgObject<V>>
    where
        I: IntoIterator<Item = (String, V)>,
    {
        let mut attrs = BTreeMap::new();
        for (name, value) in values {
            if !self.attrs.contains_key(&name) {
                return Err(GrammarError::new(format!(
                    "Unknown attribute '{}' for rule '{}'.",
                    name, self.name
                )));
            }
            attrs.insert(name, value);
        }
        Ok(PgObject {
            class: self.name.clone(),
            attrs,
        })
    }
}

/// A result record of a rule with named matches.
#[derive(Clone, Debug, PartialEq)]
pub struct PgObject<V> {
    pub class: String,
    pub attrs: BTreeMap<String, V>,
}

impl<V> PgObject<V> {
    pub fn get(&self, name: &str) -> Option<&V> {
        self.attrs.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_keeps_both_definitions() {
        let mut class = PgClass::new("Assign");
        class.merge(vec![PgAttribute::new("lhs", Multiplicity::One, "Name")]);
        class.merge(vec![
            PgAttribute::new("rhs", Multiplicity::ZeroOrMore, "Expr"),
            PgAttribute::new("lhs", Multiplicity::Optional, "Name"),
        ]);
        assert_eq!(class.attrs.len(), 2);
        assert_eq!(class.attr("lhs").unwrap().multiplicity, Multiplicity::Optional);
        assert_eq!(class.attr("rhs").unwrap().to_string(), "rhs: Expr [0..*]");
    }

    #[test]
    fn instantiate_checks_names() {
        let mut class = PgClass::new("Pair");
        class.merge(vec![PgAttribute::new("key", Multiplicity::One, "Name")]);
        let obj = class.instantiate(vec![("key".to_string(), 1)]).unwrap();
        assert_eq!(obj.get("key"), Some(&1));
        assert_eq!(obj.class, "Pair");
        let err = class.instantiate(vec![("value".to_string(), 2)]).unwrap_err();
        assert_eq!(err.message, "Unknown attribute 'value' for rule 'Pair'.");
    }
}
