//! Domain types shared by the unit tests.

use crate::{
    JsonMap,
    error::ViewError,
    model::FieldTable,
    traits::{Identity, Tagged, Viewable},
};
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;
use std::{any::Any, collections::BTreeMap};
use time::{Date, PrimitiveDateTime};

crate::view_enum! {
    pub enum Status {
        Active => "ACTIVE",
        Suspended => "SUSPENDED_ACCOUNT",
    }
}

crate::view_enum! {
    pub enum Color { Red, Green }
}

///
/// Address
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Address {
    pub street: String,
    pub city: String,
}

impl Address {
    pub fn new(street: &str, city: &str) -> Self {
        Self {
            street: street.to_string(),
            city: city.to_string(),
        }
    }
}

impl Viewable for Address {
    const TYPE_TAG: &'static str = "Address";

    fn describe(fields: &mut FieldTable<Self>) {
        fields
            .simple("street", |a| &a.street, |a, v| a.street = v)
            .simple("city", |a| &a.city, |a, v| a.city = v);
    }

    fn instantiate() -> Option<Self> {
        Some(Self::default())
    }
}

///
/// Team
///
/// Entity with a read-only id and an optimistic-lock version.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Team {
    pub id: i64,
    pub name: String,
    pub version: i64,
}

impl Team {
    pub fn new(id: i64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            version: 1,
        }
    }
}

impl Viewable for Team {
    const TYPE_TAG: &'static str = "Team";
    const IDENTITY: Identity = Identity::Entity;

    fn describe(fields: &mut FieldTable<Self>) {
        fields
            .read_only("id", |t| &t.id)
            .simple("name", |t| &t.name, |t, v| t.name = v)
            .version("version", |t| &t.version);
    }

    fn instantiate() -> Option<Self> {
        Some(Self::default())
    }
}

///
/// Member
///
/// Value type that references entities.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Member {
    pub name: String,
    pub team: Option<Team>,
    pub teams: Vec<Team>,
}

impl Viewable for Member {
    const TYPE_TAG: &'static str = "Member";

    fn describe(fields: &mut FieldTable<Self>) {
        fields
            .simple("name", |m| &m.name, |m, v| m.name = v)
            .object("team", |m| m.team.as_ref(), |m, v| m.team = v)
            .list("teams", |m| &m.teams, |m, v| m.teams = v);
    }

    fn instantiate() -> Option<Self> {
        Some(Self::default())
    }
}

///
/// Profile
///
/// Covers every scalar kind and every accessor flavour.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Profile {
    pub name: String,
    pub nickname: Option<String>,
    pub age: i32,
    pub level: i8,
    pub rank: i16,
    pub visits: i64,
    pub ratio: f32,
    pub weight: f64,
    pub balance: Decimal,
    pub initial: char,
    pub active: bool,
    pub status: Status,
    pub color: Option<Color>,
    pub joined: Option<Date>,
    pub last_seen: Option<PrimitiveDateTime>,
    pub code: String,
    pub password_hash: String,
    pub address: Option<Address>,
    pub tags: Vec<String>,
    pub lucky: Vec<i64>,
    pub addresses: Vec<Address>,
    pub statuses: Vec<Status>,
    pub contacts: BTreeMap<String, Address>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            name: String::new(),
            nickname: None,
            age: 0,
            level: 0,
            rank: 0,
            visits: 0,
            ratio: 0.0,
            weight: 0.0,
            balance: Decimal::ZERO,
            initial: ' ',
            active: false,
            status: Status::Active,
            color: None,
            joined: None,
            last_seen: None,
            code: "P-0".to_string(),
            password_hash: String::new(),
            address: None,
            tags: Vec::new(),
            lucky: Vec::new(),
            addresses: Vec::new(),
            statuses: Vec::new(),
            contacts: BTreeMap::new(),
        }
    }
}

impl Viewable for Profile {
    const TYPE_TAG: &'static str = "Profile";

    fn describe(fields: &mut FieldTable<Self>) {
        fields
            .simple("name", |p| &p.name, |p, v| p.name = v)
            .simple("nickname", |p| &p.nickname, |p, v| p.nickname = v)
            .simple("age", |p| &p.age, |p, v| p.age = v)
            .simple("level", |p| &p.level, |p, v| p.level = v)
            .simple("rank", |p| &p.rank, |p, v| p.rank = v)
            .simple("visits", |p| &p.visits, |p, v| p.visits = v)
            .simple("ratio", |p| &p.ratio, |p, v| p.ratio = v)
            .simple("weight", |p| &p.weight, |p, v| p.weight = v)
            .simple("balance", |p| &p.balance, |p, v| p.balance = v)
            .simple("initial", |p| &p.initial, |p, v| p.initial = v)
            .simple("active", |p| &p.active, |p, v| p.active = v)
            .simple("status", |p| &p.status, |p, v| p.status = v)
            .simple("color", |p| &p.color, |p, v| p.color = v)
            .simple("joined", |p| &p.joined, |p, v| p.joined = v)
            .simple("last_seen", |p| &p.last_seen, |p, v| p.last_seen = v)
            .read_only("code", |p| &p.code)
            .computed("display_name", |p| format!("{} ({})", p.name, p.age))
            .write_only("password", |p, v: String| {
                p.password_hash = format!("hashed:{v}");
            })
            .object("address", |p| p.address.as_ref(), |p, v| p.address = v)
            .list("tags", |p| &p.tags, |p, v| p.tags = v)
            .list("lucky", |p| &p.lucky, |p, v| p.lucky = v)
            .list("addresses", |p| &p.addresses, |p, v| p.addresses = v)
            .list("statuses", |p| &p.statuses, |p, v| p.statuses = v)
            .map("contacts", |p| &p.contacts, |p, v| p.contacts = v);
    }

    fn instantiate() -> Option<Self> {
        Some(Self::default())
    }
}

///
/// Ticket
///
/// Value type built by its own factory from the raw document.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Ticket {
    pub code: String,
    pub title: String,
}

impl Viewable for Ticket {
    const TYPE_TAG: &'static str = "Ticket";

    fn describe(fields: &mut FieldTable<Self>) {
        fields
            .read_only("code", |t| &t.code)
            .simple("title", |t| &t.title, |t, v| t.title = v);
    }

    fn instantiate() -> Option<Self> {
        Some(Self::default())
    }

    fn create_from_document(raw: &JsonMap) -> Option<Result<Self, ViewError>> {
        let code = raw.get("code").and_then(JsonValue::as_str)?;

        Some(Ok(Self {
            code: format!("T-{code}"),
            title: String::new(),
        }))
    }
}

///
/// Shape
///
/// Abstract entity: it can be loaded by id but never instantiated.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Shape {
    pub id: i64,
    pub sides: i32,
}

impl Viewable for Shape {
    const TYPE_TAG: &'static str = "Shape";
    const IDENTITY: Identity = Identity::Entity;

    fn describe(fields: &mut FieldTable<Self>) {
        fields
            .read_only("id", |s| &s.id)
            .simple("sides", |s| &s.sides, |s, v| s.sides = v);
    }

    fn instantiate() -> Option<Self> {
        None
    }
}

///
/// Circle / Square / Triangle
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Circle {
    pub radius: i32,
}

impl Viewable for Circle {
    const TYPE_TAG: &'static str = "Circle";

    fn describe(fields: &mut FieldTable<Self>) {
        fields.simple("radius", |c| &c.radius, |c, v| c.radius = v);
    }

    fn instantiate() -> Option<Self> {
        Some(Self::default())
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Square {
    pub side: i32,
}

impl Viewable for Square {
    const TYPE_TAG: &'static str = "Square";

    fn describe(fields: &mut FieldTable<Self>) {
        fields.simple("side", |s| &s.side, |s, v| s.side = v);
    }

    fn instantiate() -> Option<Self> {
        Some(Self::default())
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Triangle {
    pub base: i32,
}

impl Viewable for Triangle {
    const TYPE_TAG: &'static str = "Triangle";

    fn describe(fields: &mut FieldTable<Self>) {
        fields.simple("base", |t| &t.base, |t, v| t.base = v);
    }

    fn instantiate() -> Option<Self> {
        Some(Self::default())
    }
}

///
/// Figure
///
/// Heterogeneous value; tagged by its active variant.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Figure {
    Circle(Circle),
    Square(Square),
    Triangle(Triangle),
}

impl Tagged for Figure {
    fn type_tag(&self) -> &'static str {
        match self {
            Self::Circle(inner) => inner.type_tag(),
            Self::Square(inner) => inner.type_tag(),
            Self::Triangle(inner) => inner.type_tag(),
        }
    }

    fn as_any(&self) -> &(dyn Any + 'static) {
        match self {
            Self::Circle(inner) => inner,
            Self::Square(inner) => inner,
            Self::Triangle(inner) => inner,
        }
    }
}
