use std::cell::Cell;
use std::fmt::Write;
use std::rc::Rc;

use crate::utils::lerp;

/// Live link to an external scalar, one variant per primitive type.
#[derive(Debug, Clone)]
pub enum Binding {
    Bool(Rc<Cell<bool>>),
    Int(Rc<Cell<i32>>),
    Long(Rc<Cell<i64>>),
    Float(Rc<Cell<f32>>),
    Double(Rc<Cell<f64>>),
}

/// One recorded value, kept in the representation of its binding so that
/// integers survive replay exactly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleValue {
    Bool(bool),
    Int(i64),
    Real(f64),
}

impl SampleValue {
    pub fn as_f64(self) -> f64 {
        match self {
            SampleValue::Bool(b) => f64::from(u8::from(b)),
            SampleValue::Int(v) => v as f64,
            SampleValue::Real(v) => v,
        }
    }

    fn as_i64(self) -> i64 {
        match self {
            SampleValue::Bool(b) => i64::from(b),
            SampleValue::Int(v) => v,
            SampleValue::Real(v) => v.round() as i64,
        }
    }

    fn as_bool(self) -> bool {
        match self {
            SampleValue::Bool(b) => b,
            SampleValue::Int(v) => v != 0,
            SampleValue::Real(v) => v >= 0.5,
        }
    }
}

/// Integer interpolation on the difference, so both end points are exact
fn lerp_i64(prev: i64, next: i64, fraction: f64) -> i64 {
    if fraction <= 0.0 {
        return prev;
    }
    if fraction >= 1.0 {
        return next;
    }
    let span = i128::from(next) - i128::from(prev);
    let offset = (span as f64 * fraction).round() as i128;
    (i128::from(prev) + offset).clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}

impl Binding {
    pub fn get(&self) -> SampleValue {
        match self {
            Binding::Bool(cell) => SampleValue::Bool(cell.get()),
            Binding::Int(cell) => SampleValue::Int(i64::from(cell.get())),
            Binding::Long(cell) => SampleValue::Int(cell.get()),
            Binding::Float(cell) => SampleValue::Real(f64::from(cell.get())),
            Binding::Double(cell) => SampleValue::Real(cell.get()),
        }
    }

    pub fn set(&self, value: SampleValue) {
        match self {
            Binding::Bool(cell) => cell.set(value.as_bool()),
            Binding::Int(cell) => {
                let v = value.as_i64().clamp(i64::from(i32::MIN), i64::from(i32::MAX));
                cell.set(v as i32)
            }
            Binding::Long(cell) => cell.set(value.as_i64()),
            Binding::Float(cell) => cell.set(value.as_f64() as f32),
            Binding::Double(cell) => cell.set(value.as_f64()),
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Binding::Bool(_) => "bool",
            Binding::Int(_) => "i32",
            Binding::Long(_) => "i64",
            Binding::Float(_) => "f32",
            Binding::Double(_) => "f64",
        }
    }
}

/// A named recorder channel.
#[derive(Debug, Clone)]
pub struct Variable {
    name: String,
    binding: Binding,
    precision: usize,
}

impl Variable {
    pub fn new(name: impl Into<String>, binding: Binding, precision: usize) -> Self {
        Self {
            name: name.into(),
            binding,
            precision,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn binding(&self) -> &Binding {
        &self.binding
    }

    pub fn precision(&self) -> usize {
        self.precision
    }

    /// Seed the binding from the first replayed sample
    pub fn init(&self, sample: SampleValue) {
        self.binding.set(sample);
    }

    /// Set the binding to the value `fraction` of the way from `prev` to `next`.
    /// Booleans hold the previous sample until the next one is reached;
    /// integers are interpolated in integer arithmetic and rounded.
    pub fn interpolate(&self, prev: SampleValue, next: SampleValue, fraction: f64) {
        let value = match (prev, next) {
            (SampleValue::Int(a), SampleValue::Int(b)) => SampleValue::Int(lerp_i64(a, b, fraction)),
            (SampleValue::Real(a), SampleValue::Real(b)) => SampleValue::Real(lerp(a, b, fraction)),
            _ => {
                if fraction >= 1.0 {
                    next
                } else {
                    prev
                }
            }
        };
        self.binding.set(value);
    }

    /// Parse a recorded token for this variable's type
    pub fn read(&self, token: &str) -> Option<SampleValue> {
        let token = token.trim();
        match self.binding {
            Binding::Bool(_) => match token {
                "0" | "false" => Some(SampleValue::Bool(false)),
                "1" | "true" => Some(SampleValue::Bool(true)),
                _ => None,
            },
            Binding::Int(_) => token.parse::<i32>().ok().map(|v| SampleValue::Int(v.into())),
            Binding::Long(_) => token.parse::<i64>().ok().map(SampleValue::Int),
            Binding::Float(_) | Binding::Double(_) => token
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(SampleValue::Real),
        }
    }

    /// Append the current value, formatted at the configured precision
    pub fn write(&self, out: &mut String) {
        // Writing into a String cannot fail
        let _ = match &self.binding {
            Binding::Bool(cell) => write!(out, "{}", u8::from(cell.get())),
            Binding::Int(cell) => write!(out, "{}", cell.get()),
            Binding::Long(cell) => write!(out, "{}", cell.get()),
            Binding::Float(cell) => write!(out, "{:.*}", self.precision, cell.get()),
            Binding::Double(cell) => write!(out, "{:.*}", self.precision, cell.get()),
        };
    }

    pub fn describe(&self) -> String {
        format!("{}: {}", self.name, self.binding.type_name())
    }
}
