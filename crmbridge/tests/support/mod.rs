#![allow(dead_code)]

use chrono::{DateTime, Utc};
use crmbridge::{
    AttributeType, CrmRecord, Entity, EntitySchema, FieldMetadata, FieldState, LookupReference, NativeValue,
    NativeValues, OptionSetEnum, Scalar,
};
use rust_decimal::Decimal;
use uuid::Uuid;

pub const ACCOUNT_TYPE: &str = "crm::Account";

#[derive(Debug, Clone, Copy, PartialEq, Eq, OptionSetEnum)]
#[crm(type_name = "crm::Account_prioritycode")]
pub enum AccountPriority {
    High,
    Normal,
    #[crm(label = "Very Low")]
    VeryLow,
}

#[derive(Debug, Default, Clone, PartialEq, CrmRecord)]
#[crm(entity = "account", type_name = "crm::Account")]
#[allow(non_snake_case)]
pub struct Account {
    pub accountid: Option<Uuid>,
    pub name: Option<String>,
    pub revenue: Option<Decimal>,
    pub prioritycode: Option<AccountPriority>,
    pub primarycontactid: Option<LookupReference>,
    pub numberofemployees: Option<i32>,
    pub Class: Option<String>,
    pub description: FieldState<String>,
    pub createdon: Option<DateTime<Utc>>,
}

pub fn account_schema() -> EntitySchema {
    EntitySchema::new("account", ACCOUNT_TYPE)
        .with_display_name("Account")
        .with_field(FieldMetadata::new("accountid", AttributeType::Uniqueidentifier).updatable(false))
        .with_field(FieldMetadata::new("name", AttributeType::String))
        .with_field(FieldMetadata::new("revenue", AttributeType::Money))
        .with_field(FieldMetadata::picklist(
            "prioritycode",
            [(1, "High"), (2, "Normal"), (3, "Very Low")],
        ))
        .with_field(FieldMetadata::new("primarycontactid", AttributeType::Lookup))
        .with_field(FieldMetadata::new("numberofemployees", AttributeType::Integer))
        .with_field(FieldMetadata::new("class", AttributeType::String))
        .with_field(FieldMetadata::new("description", AttributeType::Memo))
        .with_field(FieldMetadata::new("createdon", AttributeType::DateTime).updatable(false))
}

pub fn contoso_attributes(contact: Uuid) -> NativeValues {
    let mut attributes = NativeValues::new();
    attributes.insert("name".into(), NativeValue::string("Contoso"));
    attributes.insert("revenue".into(), NativeValue::Money(Decimal::new(150000, 2)));
    attributes.insert("prioritycode".into(), NativeValue::OptionCode(3));
    attributes.insert(
        "primarycontactid".into(),
        NativeValue::Reference(crmbridge::EntityReference::new("contact", contact)),
    );
    attributes.insert("numberofemployees".into(), NativeValue::Scalar(Scalar::Integer(120)));
    attributes.insert("class".into(), NativeValue::string("Enterprise"));
    attributes
}

pub fn account_entity(id: Uuid, attributes: NativeValues) -> Entity {
    Entity::new("account", id).with_attributes(attributes)
}

pub fn assert_registered() {
    assert!(crmbridge::is_record_registered::<Account>());
    assert_eq!(AccountPriority::DESCRIPTOR.type_name, "crm::Account_prioritycode");
}
