mod support;

use crmbridge::{
    CreateEntityStep, DeleteEntityStep, EgressOptions, EntityReference, FieldState, FieldValue, FieldValues, GetAllEntitiesStep,
    GetOptionFromValueStep, InMemoryService, MappingError, NativeValue, OptionMetadata, OptionSetEnum, StepError,
    StepOutcome, UpdateEntityStep, workflow::{ENTITY_ID_REQUIRED, PATH_ERROR, PATH_SUCCESS},
};
use rust_decimal::Decimal;
use support::{Account, AccountPriority, account_entity, account_schema, contoso_attributes};
use uuid::Uuid;

async fn seeded_service() -> (InMemoryService, Uuid) {
    let service = InMemoryService::new();
    let id = Uuid::new_v4();
    service.seed(account_entity(id, contoso_attributes(Uuid::new_v4()))).await;

    let mut other = crmbridge::NativeValues::new();
    other.insert("name".into(), NativeValue::string("Fabrikam"));
    other.insert("prioritycode".into(), NativeValue::OptionCode(1));
    service.seed(account_entity(Uuid::new_v4(), other)).await;

    (service, id)
}

fn picklist_step(field: Option<&str>) -> GetOptionFromValueStep {
    GetOptionFromValueStep::new(account_schema(), field.map(str::to_string))
}

#[tokio::test]
async fn get_all_ingests_every_record() {
    let (service, _) = seeded_service().await;
    let step = GetAllEntitiesStep::new(account_schema());
    assert_eq!(step.step_name(), "Get All Account Entities");

    let outcome = step.run::<Account>(&service).await;
    assert_eq!(outcome.path(), PATH_SUCCESS);

    let mut accounts = outcome.success().expect("records");
    accounts.sort_by(|left, right| left.name.cmp(&right.name));
    assert_eq!(accounts.len(), 2);
    assert_eq!(accounts[0].name.as_deref(), Some("Contoso"));
    assert_eq!(accounts[0].revenue, Some(Decimal::new(150000, 2)));
    assert_eq!(accounts[1].prioritycode, Some(AccountPriority::High));
}

#[tokio::test]
async fn get_all_through_registry() {
    let (service, _) = seeded_service().await;
    let step = GetAllEntitiesStep::new(account_schema());

    let records = step.run_dyn(&service).await.success().expect("records");
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|record| record.downcast_ref::<Account>().is_some()));
}

#[tokio::test]
async fn get_all_for_unknown_type_takes_error_path() {
    let (service, _) = seeded_service().await;
    let mut schema = account_schema();
    schema.type_name = "crm::Missing".into();

    let outcome = GetAllEntitiesStep::new(schema).run_dyn(&service).await;
    assert_eq!(outcome.path(), PATH_ERROR);
    assert!(outcome.error_message().expect("message").contains("crm::Missing"));
}

#[tokio::test]
async fn get_all_with_drifted_option_code_takes_error_path() {
    let service = InMemoryService::new();
    let mut attributes = crmbridge::NativeValues::new();
    attributes.insert("prioritycode".into(), NativeValue::OptionCode(7));
    service.seed(account_entity(Uuid::new_v4(), attributes)).await;

    let outcome = GetAllEntitiesStep::new(account_schema()).run::<Account>(&service).await;
    assert!(!outcome.is_success());
    assert!(outcome.error_message().expect("message").contains("no option with value 7"));
}

#[tokio::test]
async fn update_requires_entity_id() {
    let (service, _) = seeded_service().await;
    let step = UpdateEntityStep::new(account_schema(), EgressOptions::default());
    let values = FieldValues::new();

    for id in [None, Some(""), Some("   ")] {
        let outcome = step.run(&service, id, &values).await;
        assert_eq!(outcome.error_message(), Some(ENTITY_ID_REQUIRED));
    }
}

#[tokio::test]
async fn update_rejects_malformed_id() {
    let (service, _) = seeded_service().await;
    let step = UpdateEntityStep::new(account_schema(), EgressOptions::default());

    let outcome = step.run(&service, Some("not-a-guid"), &FieldValues::new()).await;
    assert_eq!(outcome.path(), PATH_ERROR);
    assert!(outcome.error_message().expect("message").contains("not-a-guid"));
}

#[tokio::test]
async fn update_merges_converted_values() {
    let (service, id) = seeded_service().await;
    let step = UpdateEntityStep::new(account_schema(), EgressOptions::new(true, false));

    let mut values = FieldValues::new();
    values.insert("name".into(), FieldValue::from("Contoso Ltd"));
    values.insert("prioritycode".into(), FieldValue::from("High"));
    values.insert("revenue".into(), FieldValue::Null);

    let id_text = id.to_string();
    let outcome = step.run(&service, Some(id_text.as_str()), &values).await;
    assert!(outcome.is_success(), "{outcome:?}");

    let stored = service
        .get(&EntityReference::new("account", id))
        .await
        .expect("record still exists");
    assert_eq!(stored.attributes["name"], NativeValue::string("Contoso Ltd"));
    assert_eq!(stored.attributes["prioritycode"], NativeValue::OptionCode(1));
    assert_eq!(stored.attributes["revenue"], NativeValue::Money(Decimal::new(150000, 2)));
}

#[tokio::test]
async fn update_from_record_leaves_unset_fields_alone() {
    let service = InMemoryService::new();
    let id = Uuid::new_v4();
    let mut attributes = contoso_attributes(Uuid::new_v4());
    attributes.insert("description".into(), NativeValue::string("Key account"));
    service.seed(account_entity(id, attributes)).await;

    let step = UpdateEntityStep::new(account_schema(), EgressOptions::default());
    let account = Account {
        name: Some("Renamed".into()),
        description: FieldState::Null,
        ..Account::default()
    };

    let id_text = id.to_string();
    let outcome = step.run_record(&service, Some(id_text.as_str()), &account).await;
    assert!(outcome.is_success(), "{outcome:?}");

    let stored = service.get(&EntityReference::new("account", id)).await.expect("record");
    assert_eq!(stored.attributes["name"], NativeValue::string("Renamed"));
    assert_eq!(stored.attributes["revenue"], NativeValue::Money(Decimal::new(150000, 2)));
    assert_eq!(stored.attributes["prioritycode"], NativeValue::OptionCode(3));
    assert_eq!(stored.attributes["class"], NativeValue::string("Enterprise"));
    assert_eq!(stored.attributes["description"], NativeValue::Null);
}

#[tokio::test]
async fn update_of_missing_record_takes_error_path() {
    let (service, _) = seeded_service().await;
    let step = UpdateEntityStep::new(account_schema(), EgressOptions::default());
    let missing = Uuid::new_v4().to_string();

    let outcome = step.run(&service, Some(missing.as_str()), &FieldValues::new()).await;
    assert!(outcome.error_message().expect("message").contains("not found"));
}

#[tokio::test]
async fn create_then_delete() {
    let service = InMemoryService::new();
    let schema = account_schema();
    let account = Account {
        name: Some("Northwind".into()),
        prioritycode: Some(AccountPriority::Normal),
        ..Account::default()
    };

    let id = CreateEntityStep::new(schema.clone(), EgressOptions::new(true, false))
        .run_record(&service, &account)
        .await
        .success()
        .expect("created");
    assert_ne!(id, Uuid::nil());

    let stored = service.get(&EntityReference::new("account", id)).await.expect("record");
    assert_eq!(stored.attributes.len(), 2);
    assert_eq!(stored.attributes["prioritycode"], NativeValue::OptionCode(2));

    let delete = DeleteEntityStep::new(schema);
    let id_text = id.to_string();
    assert!(delete.run(&service, Some(id_text.as_str())).await.is_success());
    assert_eq!(service.count("account").await, 0);

    let again = delete.run(&service, Some(id_text.as_str())).await;
    assert_eq!(again.path(), PATH_ERROR);
    assert_eq!(delete.run(&service, None).await.error_message(), Some(ENTITY_ID_REQUIRED));
}

#[test]
fn option_step_translates_codes() {
    let step = picklist_step(Some("prioritycode"));
    assert!(step.validation_issues().is_empty());
    assert_eq!(step.available_option_sets(), vec!["prioritycode"]);
    assert_eq!(step.step_name(), "Get Option For Account");

    let outcome = step.run(Some(2)).expect("configured");
    assert_eq!(outcome, StepOutcome::Success(AccountPriority::Normal.constant()));

    let typed = step.run_typed::<AccountPriority>(Some(3)).expect("configured");
    assert_eq!(typed.success(), Some(AccountPriority::VeryLow));
}

#[test]
fn option_step_error_paths() {
    let step = picklist_step(Some("prioritycode"));

    let missing = step.run(None).expect("configured");
    assert_eq!(missing.error_message(), Some("No option value input was given"));

    let unknown = step.run(Some(9)).expect("configured");
    assert_eq!(unknown.error_message(), Some("No option found with value 9"));

    let mut schema = account_schema();
    schema.fields.retain(|field| field.name != "prioritycode");
    let outcome = GetOptionFromValueStep::new(schema, Some("prioritycode".into()))
        .run(Some(1))
        .expect("configured");
    assert_eq!(
        outcome.error_message(),
        Some("No option set field found with name prioritycode")
    );
}

#[test]
fn option_step_misconfiguration_is_an_error() {
    let unset = picklist_step(None);
    assert_eq!(unset.validation_issues()[0].code, "required");
    assert!(matches!(unset.run(Some(1)), Err(StepError::Misconfigured { .. })));

    let not_an_option_set = picklist_step(Some("name"));
    let err = not_an_option_set.run(Some(1)).unwrap_err();
    assert!(err.to_string().contains("Couldn't find option set property name"));

    let mut schema = account_schema();
    schema.type_name = "crm::Missing".into();
    let unregistered = GetOptionFromValueStep::new(schema, Some("prioritycode".into()));
    assert!(
        unregistered
            .validation_issues()
            .iter()
            .any(|issue| issue.code == "record_type_not_found")
    );
}

#[test]
fn option_step_label_drift_is_fatal() {
    let mut schema = account_schema();
    if let Some(field) = schema.fields.iter_mut().find(|field| field.name == "prioritycode") {
        field.option_set.push(OptionMetadata::new(4, "Critical"));
    }

    let err = GetOptionFromValueStep::new(schema, Some("prioritycode".into()))
        .run(Some(4))
        .unwrap_err();
    assert!(matches!(
        err,
        StepError::Mapping(MappingError::EnumConstantNotFound { code: 4, .. })
    ));
}
