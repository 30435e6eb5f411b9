//! Shared test entities: a `Person` owning an optional `Address`.

use crate::Schema;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Address {
    pub id: i32,
    pub city: String,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Person {
    pub id: i32,
    pub name: String,
    pub address: Option<Address>,
}

crate::entity!(
    Address,
    Schema::<Address>::builder("address", "a")
        .primary("id", |a| a.id, |a, v| a.id = v)
        .field("city", |a| a.city.clone(), |a, v| a.city = v)
        .build()
);

crate::entity!(
    Person,
    Schema::<Person>::builder("person", "p")
        .primary("id", |p| p.id, |p, v| p.id = v)
        .field("name", |p| p.name.clone(), |p, v| p.name = v)
        .relation("address_id", "id", |p| p.address.as_ref(), |p, v| p.address = v)
        .build()
);

/// `Person{1, "Ann"}` living at `Address{7, "X"}`.
pub fn ann() -> Person {
    Person {
        id: 1,
        name: "Ann".to_string(),
        address: Some(Address {
            id: 7,
            city: "X".to_string(),
        }),
    }
}
