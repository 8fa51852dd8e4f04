use chrono::{NaiveDate, TimeZone, Utc};
use db::{
    DBService,
    models::{
        client::{Client, CreateClient},
        license::{CreateLicense, License},
        service_type::{CreateServiceType, ServiceType},
        support::{CreateSupportTicket, SupportTicket},
        task::{CreateTask, Task, TaskReportQuery, TaskStatus, TaskStatusChange, UpdateTask},
    },
};
use pretty_assertions::assert_eq;

async fn seed_client(db: &DBService) -> Client {
    Client::create(
        &db.pool,
        &CreateClient {
            name: "Padaria Central".into(),
            legal_name: Some("Padaria Central ME".into()),
            tax_id: "12345678000199".into(),
            phone: Some("11987654321".into()),
            email: Some("contato@padariacentral.com.br".into()),
            address: None,
        },
    )
    .await
    .unwrap()
}

async fn seed_service_type(db: &DBService) -> ServiceType {
    ServiceType::create(
        &db.pool,
        &CreateServiceType {
            name: "Alvará de Funcionamento".into(),
            authority: Some("Prefeitura".into()),
        },
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn task_crud_and_status_history() {
    let db = DBService::new_in_memory().await.unwrap();
    let client = seed_client(&db).await;
    let service = seed_service_type(&db).await;

    let task = Task::create(
        &db.pool,
        &CreateTask {
            client_id: client.id,
            service_type_id: service.id,
            status: None,
            start_date: None,
            due_date: Some(NaiveDate::from_ymd_opt(2025, 12, 1).unwrap()),
            total_value: Some(1500.0),
            notes: Some("documentação pendente".into()),
        },
    )
    .await
    .unwrap();
    assert_eq!(task.status, "Iniciado");

    // No history for the initial status.
    let history = TaskStatusChange::find_by_task_id(&db.pool, task.id)
        .await
        .unwrap();
    assert!(history.is_empty());

    let updated = Task::update(
        &db.pool,
        task.id,
        &UpdateTask {
            status: Some(TaskStatus::Execucao),
            due_date: None,
            total_value: None,
            notes: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.status, "Execucao");
    assert_eq!(updated.total_value, Some(1500.0));

    let history = TaskStatusChange::find_by_task_id(&db.pool, task.id)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, "Execucao");

    // Updating without a status change appends nothing.
    Task::update(
        &db.pool,
        task.id,
        &UpdateTask {
            status: Some(TaskStatus::Execucao),
            due_date: None,
            total_value: Some(1800.0),
            notes: None,
        },
    )
    .await
    .unwrap();
    let history = TaskStatusChange::find_by_task_id(&db.pool, task.id)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);

    let fetched = Task::find_by_id(&db.pool, task.id).await.unwrap().unwrap();
    assert_eq!(fetched.client_name, "Padaria Central");
    assert_eq!(fetched.service_name, "Alvará de Funcionamento");
    assert_eq!(fetched.service_authority.as_deref(), Some("Prefeitura"));
}

#[tokio::test]
async fn unknown_status_filter_matches_nothing() {
    let db = DBService::new_in_memory().await.unwrap();
    let client = seed_client(&db).await;
    let service = seed_service_type(&db).await;

    Task::create(
        &db.pool,
        &CreateTask {
            client_id: client.id,
            service_type_id: service.id,
            status: Some(TaskStatus::Protocolado),
            start_date: None,
            due_date: None,
            total_value: None,
            notes: None,
        },
    )
    .await
    .unwrap();

    let all = Task::find_all(&db.pool, None, 100).await.unwrap();
    assert_eq!(all.len(), 1);

    let none = Task::find_all(&db.pool, Some("Arquivado"), 100)
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn report_query_date_bounds_are_inclusive() {
    let db = DBService::new_in_memory().await.unwrap();
    let client = seed_client(&db).await;
    let service = seed_service_type(&db).await;

    let boundary = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
    for (offset_days, value) in [(0, 100.0), (10, 200.0), (40, 400.0)] {
        Task::create(
            &db.pool,
            &CreateTask {
                client_id: client.id,
                service_type_id: service.id,
                status: Some(TaskStatus::Iniciado),
                start_date: Some(boundary + chrono::Duration::days(offset_days)),
                due_date: None,
                total_value: Some(value),
                notes: None,
            },
        )
        .await
        .unwrap();
    }

    // Lower bound equal to the record's date is included.
    let from_boundary = Task::find_for_report(
        &db.pool,
        &TaskReportQuery {
            start_from: Some(boundary),
            limit: 200,
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(from_boundary.len(), 3);

    // Upper bound open on the other side.
    let windowed = Task::find_for_report(
        &db.pool,
        &TaskReportQuery {
            start_from: Some(boundary),
            start_until: Some(boundary + chrono::Duration::days(10)),
            limit: 200,
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(windowed.len(), 2);

    // Descending id order.
    assert!(windowed[0].id > windowed[1].id);
}

#[tokio::test]
async fn support_ticket_billing_is_computed_on_write() {
    let db = DBService::new_in_memory().await.unwrap();
    let client = seed_client(&db).await;

    let start = Utc.with_ymd_and_hms(2025, 4, 2, 14, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2025, 4, 2, 16, 0, 0).unwrap();
    let ticket = SupportTicket::create(
        &db.pool,
        &CreateSupportTicket {
            client_id: client.id,
            description: "Emissão de NF travada".into(),
            hourly_rate: 150.0,
            support_date: Some(start),
            start_time: start,
            end_time: Some(end),
        },
    )
    .await
    .unwrap();
    assert_eq!(ticket.duration_hours, Some(2.0));
    assert_eq!(ticket.total_value, Some(300.0));
}

#[tokio::test]
async fn deleting_a_client_cascades_to_dependents() {
    let db = DBService::new_in_memory().await.unwrap();
    let client = seed_client(&db).await;
    let service = seed_service_type(&db).await;

    Task::create(
        &db.pool,
        &CreateTask {
            client_id: client.id,
            service_type_id: service.id,
            status: None,
            start_date: None,
            due_date: None,
            total_value: None,
            notes: None,
        },
    )
    .await
    .unwrap();
    License::create(
        &db.pool,
        &CreateLicense {
            client_id: client.id,
            name: "Certificado Digital A1".into(),
            expires_on: NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
            notes: None,
        },
    )
    .await
    .unwrap();

    let deleted = Client::delete(&db.pool, client.id).await.unwrap();
    assert_eq!(deleted, 1);

    assert!(Task::find_all(&db.pool, None, 100).await.unwrap().is_empty());
    assert!(
        License::find_all(&db.pool, None)
            .await
            .unwrap()
            .is_empty()
    );
}
