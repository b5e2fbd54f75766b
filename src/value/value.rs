//! Core value, record and property types.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Shared handle to an ordered sequence of values.
pub type SequenceRef = Rc<RefCell<Vec<Value>>>;

/// Shared handle to a record.
///
/// Handle identity (`Rc` pointer identity), not structural equality, is what
/// cycle detection and the aliasing behavior of `merge` are defined over.
pub type RecordRef = Rc<RefCell<Record>>;

/// Getter half of an accessor property. Receives the owning record.
pub type Getter = Rc<dyn Fn(&Record) -> Value>;

/// Setter half of an accessor property. Receives the owning record and the
/// value being written.
pub type Setter = Rc<dyn Fn(&mut Record, Value)>;

/// Value represents a dynamic value of any of the supported kinds.
///
/// Containers are reference-counted handles so that structures can share
/// them or cycle through them. A cyclic structure keeps itself alive until
/// the caller breaks the cycle.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Sequence(SequenceRef),
    Record(RecordRef),
}

/// PropertyValue is the tagged payload of a property: either a plain stored
/// value or an accessor defined by getter/setter functions.
#[derive(Clone)]
pub enum PropertyValue {
    Stored(Value),
    Accessor {
        get: Option<Getter>,
        set: Option<Setter>,
    },
}

/// Property is a full attribute descriptor: a payload plus the flags that
/// control enumeration and plain writes.
///
/// `writable` only applies to stored payloads; accessor writes are governed
/// by the presence of a setter.
#[derive(Clone)]
pub struct Property {
    pub value: PropertyValue,
    pub enumerable: bool,
    pub writable: bool,
}

/// A single key slot of a record.
#[derive(Clone)]
struct Slot {
    key: String,
    property: Property,
}

/// Record is an insertion-ordered mapping from unique string keys to
/// properties.
///
/// Redefining an existing key keeps its original position; new keys append.
#[derive(Clone, Default)]
pub struct Record {
    slots: Vec<Slot>,
}

impl Value {
    /// Wraps a record in a fresh shared handle.
    pub fn record(record: Record) -> Value {
        Value::Record(record.into_ref())
    }

    /// Wraps a list of values in a fresh shared sequence handle.
    pub fn sequence(items: Vec<Value>) -> Value {
        Value::Sequence(Rc::new(RefCell::new(items)))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    pub fn is_int(&self) -> bool {
        matches!(self, Value::Int(_))
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Value::Float(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, Value::Sequence(_))
    }

    pub fn is_record(&self) -> bool {
        matches!(self, Value::Record(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&SequenceRef> {
        match self {
            Value::Sequence(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&RecordRef> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Truthiness in the ECMAScript sense: null, false, zero, NaN and the
    /// empty string are falsy; containers are always truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0 && !f.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Sequence(_) | Value::Record(_) => true,
        }
    }
}

impl Property {
    /// Creates a plain stored property with default flags (enumerable,
    /// writable).
    pub fn stored(value: Value) -> Self {
        Property {
            value: PropertyValue::Stored(value),
            enumerable: true,
            writable: true,
        }
    }

    /// Creates an accessor property with default flags.
    pub fn accessor(get: Option<Getter>, set: Option<Setter>) -> Self {
        Property {
            value: PropertyValue::Accessor { get, set },
            enumerable: true,
            writable: true,
        }
    }

    pub fn with_enumerable(mut self, enumerable: bool) -> Self {
        self.enumerable = enumerable;
        self
    }

    pub fn with_writable(mut self, writable: bool) -> Self {
        self.writable = writable;
        self
    }

    pub fn is_accessor(&self) -> bool {
        matches!(self.value, PropertyValue::Accessor { .. })
    }

    /// Evaluates the property against its owning record. Stored payloads are
    /// returned as cheap handle clones; accessors invoke their getter, or
    /// yield `Null` when no getter is defined.
    pub fn read(&self, owner: &Record) -> Value {
        match &self.value {
            PropertyValue::Stored(v) => v.clone(),
            PropertyValue::Accessor { get: Some(get), .. } => get(owner),
            PropertyValue::Accessor { get: None, .. } => Value::Null,
        }
    }
}

impl Record {
    pub fn new() -> Self {
        Record { slots: Vec::new() }
    }

    /// Moves the record behind a fresh shared handle.
    pub fn into_ref(self) -> RecordRef {
        Rc::new(RefCell::new(self))
    }

    /// Evaluates the property stored under `key`, invoking getters.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.slots
            .iter()
            .find(|s| s.key == key)
            .map(|s| s.property.read(self))
    }

    /// Returns the raw property descriptor under `key`, without evaluation.
    pub fn get_property(&self, key: &str) -> Option<&Property> {
        self.slots.iter().find(|s| s.key == key).map(|s| &s.property)
    }

    /// Writes `value` under `key` the way a plain assignment would: invokes
    /// the setter of an accessor property, ignores the write if the property
    /// is a non-writable stored value or an accessor without a setter, and
    /// otherwise stores the value (creating the slot if needed).
    pub fn set(&mut self, key: &str, value: Value) {
        match self.slots.iter().position(|s| s.key == key) {
            None => self.slots.push(Slot {
                key: key.to_string(),
                property: Property::stored(value),
            }),
            Some(idx) => {
                let setter = match &self.slots[idx].property.value {
                    PropertyValue::Accessor { set, .. } => Some(set.clone()),
                    PropertyValue::Stored(_) => None,
                };
                match setter {
                    Some(Some(set)) => set(self, value),
                    Some(None) => {}
                    None => {
                        if self.slots[idx].property.writable {
                            self.slots[idx].property.value = PropertyValue::Stored(value);
                        }
                    }
                }
            }
        }
    }

    /// Installs a property descriptor under `key` unconditionally, keeping
    /// the slot's position if the key already exists.
    pub fn define(&mut self, key: &str, property: Property) {
        match self.slots.iter_mut().find(|s| s.key == key) {
            Some(slot) => slot.property = property,
            None => self.slots.push(Slot {
                key: key.to_string(),
                property,
            }),
        }
    }

    pub fn has(&self, key: &str) -> bool {
        self.slots.iter().any(|s| s.key == key)
    }

    /// Removes the slot under `key`, returning its descriptor.
    pub fn remove(&mut self, key: &str) -> Option<Property> {
        let idx = self.slots.iter().position(|s| s.key == key)?;
        Some(self.slots.remove(idx).property)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Iterates over all slots in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Property)> {
        self.slots.iter().map(|s| (s.key.as_str(), &s.property))
    }

    /// Iterates over the keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|s| s.key.as_str())
    }

    fn enumerable_count(&self) -> usize {
        self.slots.iter().filter(|s| s.property.enumerable).count()
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::sequence(items)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::record(record)
    }
}

impl From<RecordRef> for Value {
    fn from(record: RecordRef) -> Self {
        Value::Record(record)
    }
}

impl PartialEq for Value {
    /// Structural equality over evaluated enumerable properties. Identical
    /// handles compare equal without traversal, which also terminates the
    /// comparison of aliased cyclic branches; comparing two distinct cyclic
    /// structures is outside the contract.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Sequence(a), Value::Sequence(b)) => {
                Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow()
            }
            (Value::Record(a), Value::Record(b)) => {
                Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow()
            }
            _ => false,
        }
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        if self.enumerable_count() != other.enumerable_count() {
            return false;
        }
        for (key, property) in self.iter() {
            if !property.enumerable {
                continue;
            }
            match other.get_property(key) {
                Some(theirs) if theirs.enumerable => {
                    if property.read(self) != theirs.read(other) {
                        return false;
                    }
                }
                _ => return false,
            }
        }
        true
    }
}

/// Marker emitted when rendering a container that is already on the current
/// path from the root.
pub const CIRCULAR_MARKER: &str = "[Circular]";

pub(crate) fn container_id<T>(rc: &Rc<T>) -> usize {
    Rc::as_ptr(rc) as *const () as usize
}

fn fmt_value(value: &Value, f: &mut fmt::Formatter<'_>, path: &mut Vec<usize>) -> fmt::Result {
    match value {
        Value::Null => f.write_str("null"),
        Value::Bool(b) => write!(f, "{}", b),
        Value::Int(i) => write!(f, "{}", i),
        Value::Float(x) => write!(f, "{}", x),
        Value::String(s) => write!(f, "{:?}", s),
        Value::Sequence(rc) => {
            let id = container_id(rc);
            if path.contains(&id) {
                return write!(f, "{:?}", CIRCULAR_MARKER);
            }
            path.push(id);
            f.write_str("[")?;
            let items = rc.borrow();
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                fmt_value(item, f, path)?;
            }
            path.pop();
            f.write_str("]")
        }
        Value::Record(rc) => {
            let id = container_id(rc);
            if path.contains(&id) {
                return write!(f, "{:?}", CIRCULAR_MARKER);
            }
            path.push(id);
            let record = rc.borrow();
            fmt_record(&record, f, path)?;
            path.pop();
            Ok(())
        }
    }
}

fn fmt_record(record: &Record, f: &mut fmt::Formatter<'_>, path: &mut Vec<usize>) -> fmt::Result {
    f.write_str("{")?;
    let mut first = true;
    for (key, property) in record.iter() {
        if !property.enumerable {
            continue;
        }
        if !first {
            f.write_str(",")?;
        }
        first = false;
        write!(f, "{:?}:", key)?;
        fmt_value(&property.read(record), f, path)?;
    }
    f.write_str("}")
}

impl fmt::Display for Value {
    /// Renders compact JSON, with any container already on the current path
    /// printed as the string `"[Circular]"` so cyclic values stay printable.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_value(self, f, &mut Vec::new())
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_record(self, f, &mut Vec::new())
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            PropertyValue::Stored(v) => f
                .debug_struct("Stored")
                .field("value", v)
                .field("enumerable", &self.enumerable)
                .field("writable", &self.writable)
                .finish(),
            PropertyValue::Accessor { get, set } => f
                .debug_struct("Accessor")
                .field("get", &get.is_some())
                .field("set", &set.is_some())
                .field("enumerable", &self.enumerable)
                .finish(),
        }
    }
}
