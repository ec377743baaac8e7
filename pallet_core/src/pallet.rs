//! # Pallet Data Structures
//!
//! A [`Pallet`] mirrors one row of the `pallets` table. The properties editor
//! works field by field: the user types text, [`PalletField::parse`] coerces
//! it to a typed [`FieldValue`], and the store writes that single column.
//!
//! ```rust
//! use pallet_core::pallet::{FieldValue, PalletField};
//!
//! let value = PalletField::Visible.parse(" Sí ").unwrap();
//! assert_eq!(value, FieldValue::Bool(true));
//!
//! // Coordinates are fixed by the floor-plan layout
//! assert!(PalletField::X.parse("10").is_err());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{StoreError, StoreResult};

/// One pallet on the floor plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pallet {
    pub id: i64,
    pub length: f64,
    pub width: f64,
    pub height: f64,
    /// Storage position index, copied into orders as their origin
    pub position: i64,
    /// Quality grade (free text)
    pub quality: String,
    pub weight: f64,
    pub priority: i64,
    /// Marker centre in image pixels
    pub x: f64,
    pub y: f64,
    pub visible: bool,
}

impl Pallet {
    /// Text shown for a field in the properties table.
    pub fn display_value(&self, field: PalletField) -> String {
        match field {
            PalletField::Id => self.id.to_string(),
            PalletField::Length => self.length.to_string(),
            PalletField::Width => self.width.to_string(),
            PalletField::Position => self.position.to_string(),
            PalletField::Height => self.height.to_string(),
            PalletField::Quality => self.quality.clone(),
            PalletField::Weight => self.weight.to_string(),
            PalletField::Priority => self.priority.to_string(),
            PalletField::X => self.x.to_string(),
            PalletField::Y => self.y.to_string(),
            PalletField::Visible => if self.visible { "1" } else { "0" }.to_string(),
        }
    }

    /// Apply an already-coerced value to the in-memory copy.
    pub fn apply(&mut self, field: PalletField, value: &FieldValue) -> StoreResult<()> {
        match (field, value) {
            (PalletField::Length, FieldValue::Float(v)) => self.length = *v,
            (PalletField::Width, FieldValue::Float(v)) => self.width = *v,
            (PalletField::Height, FieldValue::Float(v)) => self.height = *v,
            (PalletField::Weight, FieldValue::Float(v)) => self.weight = *v,
            (PalletField::Position, FieldValue::Int(v)) => self.position = *v,
            (PalletField::Priority, FieldValue::Int(v)) => self.priority = *v,
            (PalletField::Quality, FieldValue::Text(v)) => self.quality = v.clone(),
            (PalletField::Visible, FieldValue::Bool(v)) => self.visible = *v,
            (PalletField::Id | PalletField::X | PalletField::Y, _) => {
                return Err(StoreError::immutable_field(field.column()))
            }
            (_, other) => {
                return Err(StoreError::invalid_input(
                    field.column(),
                    other.to_string(),
                    "Value type does not match field",
                ))
            }
        }
        Ok(())
    }

    /// Short multi-line description used for the hover label on the map.
    pub fn tooltip(&self) -> String {
        format!(
            "Pallet ID: {}\nQuality: {}\nVisible: {}",
            self.id,
            if self.quality.is_empty() { "N/A" } else { &self.quality },
            if self.visible { "Yes" } else { "No" }
        )
    }
}

/// Values needed to insert a new pallet (the id is assigned by the store).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPallet {
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub position: i64,
    pub quality: String,
    pub weight: f64,
    pub priority: i64,
    pub x: f64,
    pub y: f64,
    pub visible: bool,
}

impl Default for NewPallet {
    fn default() -> Self {
        NewPallet {
            length: 1.2,
            width: 0.8,
            height: 1.0,
            position: 1,
            quality: "A".to_string(),
            weight: 0.0,
            priority: 0,
            x: 0.0,
            y: 0.0,
            visible: true,
        }
    }
}

/// Columns of the `pallets` table, in properties-table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PalletField {
    Id,
    Length,
    Width,
    Position,
    Height,
    Quality,
    Weight,
    Priority,
    X,
    Y,
    Visible,
}

impl PalletField {
    pub const ALL: &'static [PalletField] = &[
        PalletField::Id,
        PalletField::Length,
        PalletField::Width,
        PalletField::Position,
        PalletField::Height,
        PalletField::Quality,
        PalletField::Weight,
        PalletField::Priority,
        PalletField::X,
        PalletField::Y,
        PalletField::Visible,
    ];

    /// Column name in the SQLite schema
    pub fn column(&self) -> &'static str {
        match self {
            PalletField::Id => "ID",
            PalletField::Length => "Largo",
            PalletField::Width => "Ancho",
            PalletField::Position => "Posicion",
            PalletField::Height => "Alto",
            PalletField::Quality => "Calidad",
            PalletField::Weight => "Peso",
            PalletField::Priority => "Prioridad",
            PalletField::X => "X",
            PalletField::Y => "Y",
            PalletField::Visible => "Visibilidad",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PalletField::Id => "ID",
            PalletField::Length => "Length",
            PalletField::Width => "Width",
            PalletField::Position => "Position",
            PalletField::Height => "Height",
            PalletField::Quality => "Quality",
            PalletField::Weight => "Weight",
            PalletField::Priority => "Priority",
            PalletField::X => "X",
            PalletField::Y => "Y",
            PalletField::Visible => "Visible",
        }
    }

    /// Parse a field from either its column name or display name.
    pub fn from_name(name: &str) -> Option<PalletField> {
        let name = name.trim();
        PalletField::ALL.iter().copied().find(|f| {
            f.column().eq_ignore_ascii_case(name) || f.display_name().eq_ignore_ascii_case(name)
        })
    }

    /// ID and the map coordinates are fixed from the UI.
    pub fn is_editable(&self) -> bool {
        !matches!(self, PalletField::Id | PalletField::X | PalletField::Y)
    }

    /// Coerce user text to this field's type.
    pub fn parse(&self, raw: &str) -> StoreResult<FieldValue> {
        if !self.is_editable() {
            return Err(StoreError::immutable_field(self.column()));
        }
        let trimmed = raw.trim();
        match self {
            PalletField::Length | PalletField::Width | PalletField::Height | PalletField::Weight => {
                parse_float(self.column(), trimmed).map(FieldValue::Float)
            }
            PalletField::Priority => trimmed
                .parse::<i64>()
                .map(FieldValue::Int)
                .map_err(|_| StoreError::invalid_input(self.column(), raw, "Expected an integer")),
            PalletField::Position => parse_integral(self.column(), trimmed).map(FieldValue::Int),
            PalletField::Quality => Ok(FieldValue::Text(raw.to_string())),
            PalletField::Visible => parse_flag(self.column(), trimmed).map(FieldValue::Bool),
            PalletField::Id | PalletField::X | PalletField::Y => {
                Err(StoreError::immutable_field(self.column()))
            }
        }
    }
}

impl fmt::Display for PalletField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A typed value ready to be bound to a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(v) => write!(f, "{}", v),
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Text(v) => f.write_str(v),
            FieldValue::Bool(v) => f.write_str(if *v { "1" } else { "0" }),
        }
    }
}

const TRUE_TOKENS: &[&str] = &["1", "true", "verdadero", "sí", "si"];
const FALSE_TOKENS: &[&str] = &["0", "false", "falso", "no"];

fn parse_float(field: &str, raw: &str) -> StoreResult<f64> {
    let value: f64 = raw
        .parse()
        .map_err(|_| StoreError::invalid_input(field, raw, "Expected a number"))?;
    if !value.is_finite() {
        return Err(StoreError::invalid_input(field, raw, "Number must be finite"));
    }
    Ok(value)
}

/// Integer, or a float text with no fractional part ("3.0").
fn parse_integral(field: &str, raw: &str) -> StoreResult<i64> {
    if let Ok(v) = raw.parse::<i64>() {
        return Ok(v);
    }
    let value = parse_float(field, raw)?;
    if value.fract() != 0.0 {
        return Err(StoreError::invalid_input(field, raw, "Expected a whole number"));
    }
    Ok(value as i64)
}

fn parse_flag(field: &str, raw: &str) -> StoreResult<bool> {
    let lowered = raw.to_lowercase();
    if TRUE_TOKENS.contains(&lowered.as_str()) {
        return Ok(true);
    }
    if FALSE_TOKENS.contains(&lowered.as_str()) {
        return Ok(false);
    }
    let value = parse_float(field, raw)
        .map_err(|_| StoreError::invalid_input(field, raw, "Expected yes/no, true/false or 1/0"))?;
    Ok(value.trunc() != 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Pallet {
        Pallet {
            id: 4,
            length: 1.2,
            width: 0.8,
            height: 1.5,
            position: 7,
            quality: "B".to_string(),
            weight: 320.5,
            priority: 2,
            x: 150.0,
            y: 80.0,
            visible: true,
        }
    }

    #[test]
    fn test_truthy_tokens() {
        for token in ["1", "true", "TRUE", "verdadero", "sí", "SÍ", "si", " Si "] {
            assert_eq!(PalletField::Visible.parse(token).unwrap(), FieldValue::Bool(true), "{}", token);
        }
        for token in ["0", "false", "Falso", "no", "NO"] {
            assert_eq!(PalletField::Visible.parse(token).unwrap(), FieldValue::Bool(false), "{}", token);
        }
    }

    #[test]
    fn test_visibility_numeric_fallback() {
        assert_eq!(PalletField::Visible.parse("2").unwrap(), FieldValue::Bool(true));
        assert_eq!(PalletField::Visible.parse("0.4").unwrap(), FieldValue::Bool(false));
        assert!(PalletField::Visible.parse("maybe").is_err());
    }

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(PalletField::Weight.parse("12.5").unwrap(), FieldValue::Float(12.5));
        assert_eq!(PalletField::Length.parse("3").unwrap(), FieldValue::Float(3.0));
        assert_eq!(PalletField::Priority.parse("5").unwrap(), FieldValue::Int(5));
        assert!(PalletField::Priority.parse("5.5").is_err());
        assert_eq!(PalletField::Position.parse("3.0").unwrap(), FieldValue::Int(3));
        assert!(PalletField::Position.parse("3.5").is_err());
        assert!(PalletField::Height.parse("tall").is_err());
        assert!(PalletField::Height.parse("inf").is_err());
    }

    #[test]
    fn test_quality_kept_verbatim() {
        assert_eq!(
            PalletField::Quality.parse("Grade A ").unwrap(),
            FieldValue::Text("Grade A ".to_string())
        );
    }

    #[test]
    fn test_coordinates_are_immutable() {
        for field in [PalletField::X, PalletField::Y, PalletField::Id] {
            let err = field.parse("1").unwrap_err();
            assert_eq!(err.error_code(), "IMMUTABLE_FIELD");
        }
        let mut pallet = sample();
        assert!(pallet.apply(PalletField::X, &FieldValue::Float(1.0)).is_err());
        assert_eq!(pallet.x, 150.0);
    }

    #[test]
    fn test_apply_and_display() {
        let mut pallet = sample();
        pallet.apply(PalletField::Visible, &FieldValue::Bool(false)).unwrap();
        assert!(!pallet.visible);
        assert_eq!(pallet.display_value(PalletField::Visible), "0");

        pallet.apply(PalletField::Priority, &FieldValue::Int(9)).unwrap();
        assert_eq!(pallet.display_value(PalletField::Priority), "9");

        let mismatch = pallet.apply(PalletField::Priority, &FieldValue::Text("x".into()));
        assert!(mismatch.is_err());
    }

    #[test]
    fn test_field_names() {
        assert_eq!(PalletField::from_name("Peso"), Some(PalletField::Weight));
        assert_eq!(PalletField::from_name("visible"), Some(PalletField::Visible));
        assert_eq!(PalletField::from_name("bogus"), None);
        assert_eq!(PalletField::ALL.len(), 11);
    }

    #[test]
    fn test_tooltip() {
        let mut pallet = sample();
        assert_eq!(pallet.tooltip(), "Pallet ID: 4\nQuality: B\nVisible: Yes");
        pallet.quality.clear();
        pallet.visible = false;
        assert_eq!(pallet.tooltip(), "Pallet ID: 4\nQuality: N/A\nVisible: No");
    }
}
