use crate::{
    error::{AccessError, ViewError},
    traits::Viewable,
    value::{Scalar, SimpleValue, TargetType},
};
use std::{
    any::{Any, TypeId, type_name},
    collections::BTreeMap,
    fmt,
};

type Reader<T> = Box<dyn for<'a> Fn(&'a T) -> FieldRead<'a> + Send + Sync>;
type Writer<T> = Box<dyn Fn(&mut T, FieldWrite) -> Result<(), ViewError> + Send + Sync>;

///
/// FieldShape
///
/// Runtime kind of a field. Simple fields carry their declared setter type;
/// compound fields carry their element type.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FieldShape {
    Simple(TargetType),
    Object(ElementType),
    List(ElementType),
    Map(ElementType),
}

impl FieldShape {
    #[must_use]
    pub const fn element(&self) -> Option<ElementType> {
        match self {
            Self::Simple(_) => None,
            Self::Object(element) | Self::List(element) | Self::Map(element) => Some(*element),
        }
    }
}

///
/// ElementType
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ElementType {
    pub id: TypeId,
    pub tag: &'static str,
}

impl ElementType {
    #[must_use]
    pub fn of<U: Viewable>() -> Self {
        Self {
            id: TypeId::of::<U>(),
            tag: U::TYPE_TAG,
        }
    }
}

///
/// FieldRead
///
/// Value produced by a getter. Compound values are borrowed from the owner.
///

pub enum FieldRead<'a> {
    Simple(Option<Scalar>),
    Object(Option<&'a (dyn Any + 'static)>),
    List(Vec<&'a (dyn Any + 'static)>),
    Map(Vec<(String, &'a (dyn Any + 'static))>),
}

///
/// FieldWrite
///
/// Value handed to a setter. Compound values are owned and type-erased; the
/// writer downcasts them back to the declared element type.
///

pub enum FieldWrite {
    Simple(Option<Scalar>),
    Object(Option<Box<dyn Any>>),
    List(Vec<Box<dyn Any>>),
    Map(Vec<(String, Box<dyn Any>)>),
}

impl FieldWrite {
    const fn kind(&self) -> &'static str {
        match self {
            Self::Simple(_) => "simple",
            Self::Object(_) => "object",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }
}

///
/// FieldDescriptor
///

pub struct FieldDescriptor<T> {
    name: &'static str,
    shape: FieldShape,
    reader: Option<Reader<T>>,
    writer: Option<Writer<T>>,
    version: bool,
}

impl<T: Viewable> FieldDescriptor<T> {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub const fn shape(&self) -> FieldShape {
        self.shape
    }

    #[must_use]
    pub const fn is_simple(&self) -> bool {
        matches!(self.shape, FieldShape::Simple(_))
    }

    #[must_use]
    pub const fn is_readable(&self) -> bool {
        self.reader.is_some()
    }

    /// Version fields never expose a setter.
    #[must_use]
    pub const fn is_writable(&self) -> bool {
        self.writer.is_some() && !self.version
    }

    #[must_use]
    pub const fn is_version(&self) -> bool {
        self.version
    }

    /// Invoke the getter; `None` when the field is write-only.
    #[must_use]
    pub fn read<'a>(&self, value: &'a T) -> Option<FieldRead<'a>> {
        self.reader.as_ref().map(|reader| reader(value))
    }

    /// Invoke the setter.
    pub fn write(&self, target: &mut T, value: FieldWrite) -> Result<(), ViewError> {
        match &self.writer {
            Some(writer) if !self.version => writer(target, value),
            _ => Err(AccessError::new(
                T::TYPE_TAG,
                format!("field '{}' has no setter", self.name),
            )
            .into()),
        }
    }
}

impl<T> fmt::Debug for FieldDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("shape", &self.shape)
            .field("readable", &self.reader.is_some())
            .field("writable", &self.writer.is_some())
            .field("version", &self.version)
            .finish()
    }
}

///
/// FieldTable
///
/// Ordered accessor table for one type. Built once through `Viewable::describe`
/// and shared read-only afterwards (see `FieldTable::of`).
///

pub struct FieldTable<T> {
    type_tag: &'static str,
    fields: Vec<FieldDescriptor<T>>,
}

impl<T: Viewable> FieldTable<T> {
    #[must_use]
    pub(crate) fn describe() -> Self {
        let mut table = Self {
            type_tag: T::TYPE_TAG,
            fields: Vec::new(),
        };
        T::describe(&mut table);

        table
    }

    #[must_use]
    pub const fn type_tag(&self) -> &'static str {
        self.type_tag
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldDescriptor<T>> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldDescriptor<T>> {
        self.fields.iter()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    //
    // SIMPLE FIELDS
    //

    /// Readable and writable simple field.
    pub fn simple<F, G, S>(&mut self, name: &'static str, get: G, set: S) -> &mut Self
    where
        F: SimpleValue + 'static,
        G: Fn(&T) -> &F + Send + Sync + 'static,
        S: Fn(&mut T, F) + Send + Sync + 'static,
    {
        self.push(
            name,
            FieldShape::Simple(F::TARGET),
            Some(simple_reader(get)),
            Some(simple_writer(set)),
            false,
        )
    }

    /// Simple field with a getter only.
    pub fn read_only<F, G>(&mut self, name: &'static str, get: G) -> &mut Self
    where
        F: SimpleValue + 'static,
        G: Fn(&T) -> &F + Send + Sync + 'static,
    {
        self.push(
            name,
            FieldShape::Simple(F::TARGET),
            Some(simple_reader(get)),
            None,
            false,
        )
    }

    /// Simple field derived on read, with no backing storage.
    pub fn computed<F, G>(&mut self, name: &'static str, get: G) -> &mut Self
    where
        F: SimpleValue + 'static,
        G: Fn(&T) -> F + Send + Sync + 'static,
    {
        self.push(
            name,
            FieldShape::Simple(F::TARGET),
            Some(reader(move |value: &T| FieldRead::Simple(get(value).to_scalar()))),
            None,
            false,
        )
    }

    /// Simple field with a setter only.
    pub fn write_only<F, S>(&mut self, name: &'static str, set: S) -> &mut Self
    where
        F: SimpleValue + 'static,
        S: Fn(&mut T, F) + Send + Sync + 'static,
    {
        self.push(
            name,
            FieldShape::Simple(F::TARGET),
            None,
            Some(simple_writer(set)),
            false,
        )
    }

    /// Optimistic-lock version field: serialized, never written back.
    pub fn version<F, G>(&mut self, name: &'static str, get: G) -> &mut Self
    where
        F: SimpleValue + 'static,
        G: Fn(&T) -> &F + Send + Sync + 'static,
    {
        self.push(
            name,
            FieldShape::Simple(F::TARGET),
            Some(simple_reader(get)),
            None,
            true,
        )
    }

    //
    // COMPOUND FIELDS
    //

    /// Nested object field.
    pub fn object<U, G, S>(&mut self, name: &'static str, get: G, set: S) -> &mut Self
    where
        U: Viewable,
        G: Fn(&T) -> Option<&U> + Send + Sync + 'static,
        S: Fn(&mut T, Option<U>) + Send + Sync + 'static,
    {
        let type_tag = self.type_tag;

        self.push(
            name,
            FieldShape::Object(ElementType::of::<U>()),
            Some(reader(move |value: &T| FieldRead::Object(get(value).map(as_any)))),
            Some(writer(move |target: &mut T, write: FieldWrite| match write {
                FieldWrite::Object(Some(boxed)) => {
                    set(target, Some(downcast::<U>(type_tag, name, boxed)?));
                    Ok(())
                }
                FieldWrite::Object(None) => {
                    set(target, None);
                    Ok(())
                }
                other => Err(shape_mismatch(type_tag, name, "object", &other)),
            })),
            false,
        )
    }

    /// List field; elements share one nested view.
    pub fn list<U, G, S>(&mut self, name: &'static str, get: G, set: S) -> &mut Self
    where
        U: Viewable,
        G: Fn(&T) -> &Vec<U> + Send + Sync + 'static,
        S: Fn(&mut T, Vec<U>) + Send + Sync + 'static,
    {
        let type_tag = self.type_tag;

        self.push(
            name,
            FieldShape::List(ElementType::of::<U>()),
            Some(reader(move |value: &T| {
                FieldRead::List(get(value).iter().map(as_any).collect())
            })),
            Some(writer(move |target: &mut T, write: FieldWrite| match write {
                FieldWrite::List(items) => {
                    let items = items
                        .into_iter()
                        .enumerate()
                        .map(|(index, boxed)| {
                            downcast::<U>(type_tag, name, boxed).map_err(|err| err.with_index(index))
                        })
                        .collect::<Result<Vec<_>, _>>()?;
                    set(target, items);
                    Ok(())
                }
                other => Err(shape_mismatch(type_tag, name, "list", &other)),
            })),
            false,
        )
    }

    /// String-keyed map field; values share one nested view.
    pub fn map<U, G, S>(&mut self, name: &'static str, get: G, set: S) -> &mut Self
    where
        U: Viewable,
        G: Fn(&T) -> &BTreeMap<String, U> + Send + Sync + 'static,
        S: Fn(&mut T, BTreeMap<String, U>) + Send + Sync + 'static,
    {
        let type_tag = self.type_tag;

        self.push(
            name,
            FieldShape::Map(ElementType::of::<U>()),
            Some(reader(move |value: &T| {
                FieldRead::Map(
                    get(value)
                        .iter()
                        .map(|(key, item)| (key.clone(), as_any(item)))
                        .collect(),
                )
            })),
            Some(writer(move |target: &mut T, write: FieldWrite| match write {
                FieldWrite::Map(entries) => {
                    let entries = entries
                        .into_iter()
                        .map(|(key, boxed)| {
                            let item = downcast::<U>(type_tag, name, boxed)
                                .map_err(|err| err.with_field(&key))?;
                            Ok((key, item))
                        })
                        .collect::<Result<BTreeMap<_, _>, ViewError>>()?;
                    set(target, entries);
                    Ok(())
                }
                other => Err(shape_mismatch(type_tag, name, "map", &other)),
            })),
            false,
        )
    }

    // Re-registering a name replaces the earlier descriptor in place.
    fn push(
        &mut self,
        name: &'static str,
        shape: FieldShape,
        reader: Option<Reader<T>>,
        writer: Option<Writer<T>>,
        version: bool,
    ) -> &mut Self {
        let descriptor = FieldDescriptor {
            name,
            shape,
            reader,
            writer,
            version,
        };

        if let Some(slot) = self.fields.iter_mut().find(|field| field.name == name) {
            log::warn!(
                "field '{name}' registered twice on {}; keeping the later accessor",
                self.type_tag
            );
            *slot = descriptor;
        } else {
            self.fields.push(descriptor);
        }

        self
    }
}

impl<T> fmt::Debug for FieldTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldTable")
            .field("type_tag", &self.type_tag)
            .field("fields", &self.fields)
            .finish()
    }
}

// Closure constructors pin the higher-ranked signatures the boxes need.

fn reader<T, R>(read: R) -> Reader<T>
where
    R: for<'a> Fn(&'a T) -> FieldRead<'a> + Send + Sync + 'static,
{
    Box::new(read)
}

fn writer<T, W>(write: W) -> Writer<T>
where
    W: Fn(&mut T, FieldWrite) -> Result<(), ViewError> + Send + Sync + 'static,
{
    Box::new(write)
}

fn simple_reader<T, F, G>(get: G) -> Reader<T>
where
    F: SimpleValue + 'static,
    G: Fn(&T) -> &F + Send + Sync + 'static,
{
    reader(move |value: &T| FieldRead::Simple(get(value).to_scalar()))
}

fn simple_writer<T, F, S>(set: S) -> Writer<T>
where
    T: Viewable,
    F: SimpleValue + 'static,
    S: Fn(&mut T, F) + Send + Sync + 'static,
{
    writer(move |target: &mut T, write: FieldWrite| match write {
        FieldWrite::Simple(scalar) => {
            set(target, F::from_scalar(scalar)?);
            Ok(())
        }
        other => Err(AccessError::new(
            T::TYPE_TAG,
            format!("simple setter handed a {} value", other.kind()),
        )
        .into()),
    })
}

fn as_any<U: Any>(value: &U) -> &(dyn Any + 'static) {
    value
}

fn downcast<U: Any>(
    type_tag: &'static str,
    field: &str,
    boxed: Box<dyn Any>,
) -> Result<U, ViewError> {
    boxed.downcast::<U>().map(|value| *value).map_err(|_| {
        AccessError::new(
            type_tag,
            format!("field '{field}' expects a {}", type_name::<U>()),
        )
        .into()
    })
}

fn shape_mismatch(
    type_tag: &'static str,
    field: &str,
    expected: &str,
    found: &FieldWrite,
) -> ViewError {
    AccessError::new(
        type_tag,
        format!(
            "field '{field}' expects a {expected} value, got {}",
            found.kind()
        ),
    )
    .into()
}
