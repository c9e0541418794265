use reqwest::StatusCode;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use domain::models::{Department, DepartmentId, Employee, EmployeeId};

use crate::helpers::{
    ResponseParts, load_app_settings_for_testing, register_employee_service, split_response,
};
use crate::test_case::{EnableTracing, RawCreateDepartmentRequestBody, TestCase};

fn ann() -> Employee {
    Employee {
        id: EmployeeId(10),
        department_id: DepartmentId(1),
        name: String::from("Ann"),
        age: 30,
        position: String::from("Dev"),
    }
}

async fn mount_employees(server: &MockServer, department_id: i64, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/employees/departments/{}", department_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn user_can_create_a_department() {
    let app_settings = load_app_settings_for_testing();
    let test_case = TestCase::begin(app_settings, EnableTracing::No).await;

    let body = RawCreateDepartmentRequestBody {
        id: None,
        name: String::from("Engineering"),
    };
    let response = test_case.create_department(&body).await;
    let ResponseParts { status_code, body } = split_response(response).await;
    assert_eq!(status_code, StatusCode::OK, "Create failed: {}", body);
    let department = serde_json::from_str::<Department>(&body).unwrap();
    assert_eq!(department.id, DepartmentId(1));
    assert_eq!(department.name, "Engineering");
    assert!(department.employees.is_empty());

    let response = test_case.department_by_id("1").await;
    let ResponseParts { status_code, body } = split_response(response).await;
    assert_eq!(status_code, StatusCode::OK);
    assert_eq!(serde_json::from_str::<Department>(&body).unwrap(), department);

    test_case.end().await;
}

#[tokio::test]
async fn employees_in_request_body_are_not_stored() {
    let app_settings = load_app_settings_for_testing();
    let test_case = TestCase::begin(app_settings, EnableTracing::No).await;

    let uri = format!("{}/departments", test_case.origin());
    let response = test_case
        .http_client
        .post(&uri)
        .json(&serde_json::json!({
            "id": 1,
            "name": "Engineering",
            "employees": [serde_json::to_value(ann()).unwrap()]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = test_case.list_departments().await;
    let departments = response.json::<Vec<Department>>().await.unwrap();
    assert_eq!(departments.len(), 1);
    assert!(departments[0].employees.is_empty());

    test_case.end().await;
}

#[tokio::test]
async fn user_can_not_create_a_department_with_an_existing_id() {
    let app_settings = load_app_settings_for_testing();
    let test_case = TestCase::begin(app_settings, EnableTracing::No).await;
    test_case.insert_departments(&[(1, "Engineering")]).await;

    let body = RawCreateDepartmentRequestBody {
        id: Some(1),
        name: String::from("Sales"),
    };
    let response = test_case.create_department(&body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    test_case.end().await;
}

#[tokio::test]
async fn user_can_list_departments_in_creation_order() {
    let app_settings = load_app_settings_for_testing();
    let test_case = TestCase::begin(app_settings, EnableTracing::No).await;
    test_case
        .insert_departments(&[(2, "Sales"), (1, "Engineering")])
        .await;

    let response = test_case.list_departments().await;
    let ResponseParts { status_code, body } = split_response(response).await;
    assert_eq!(status_code, StatusCode::OK);
    let departments = serde_json::from_str::<Vec<Department>>(&body).unwrap();
    assert_eq!(
        departments,
        vec![
            Department::new(DepartmentId(2), String::from("Sales")),
            Department::new(DepartmentId(1), String::from("Engineering")),
        ]
    );

    test_case.end().await;
}

#[tokio::test]
async fn getting_an_unknown_department_returns_not_found() {
    let app_settings = load_app_settings_for_testing();
    let test_case = TestCase::begin(app_settings, EnableTracing::No).await;

    let response = test_case.department_by_id("42").await;
    let ResponseParts { status_code, body } = split_response(response).await;
    assert_eq!(status_code, StatusCode::NOT_FOUND);
    let body = serde_json::from_str::<serde_json::Value>(&body).unwrap();
    assert_eq!(
        body,
        serde_json::json!({"messages": ["Department 42 is not found"]})
    );

    test_case.end().await;
}

#[tokio::test]
async fn getting_a_department_with_a_non_numeric_id_is_rejected() {
    let app_settings = load_app_settings_for_testing();
    let test_case = TestCase::begin(app_settings, EnableTracing::No).await;

    let response = test_case.department_by_id("engineering").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    test_case.end().await;
}

#[tokio::test]
async fn user_can_list_departments_with_employees() {
    let employee_service = MockServer::start().await;
    mount_employees(
        &employee_service,
        1,
        serde_json::json!([
            {"id": 10, "departmentId": 1, "name": "Ann", "age": 30, "position": "Dev"}
        ]),
    )
    .await;
    mount_employees(&employee_service, 2, serde_json::json!([])).await;
    let mut app_settings = load_app_settings_for_testing();
    register_employee_service(&mut app_settings, &[&employee_service]);
    let test_case = TestCase::begin(app_settings, EnableTracing::No).await;
    test_case
        .insert_departments(&[(1, "Engineering"), (2, "Sales")])
        .await;

    let response = test_case.list_departments_with_employees().await;
    let ResponseParts { status_code, body } = split_response(response).await;
    assert_eq!(status_code, StatusCode::OK, "Request failed: {}", body);
    let departments = serde_json::from_str::<Vec<Department>>(&body).unwrap();
    assert_eq!(
        departments,
        vec![
            Department::new(DepartmentId(1), String::from("Engineering"))
                .with_employees(vec![ann()]),
            Department::new(DepartmentId(2), String::from("Sales")),
        ]
    );

    // 従業員は部署リストには保存されない
    let response = test_case.list_departments().await;
    let departments = response.json::<Vec<Department>>().await.unwrap();
    assert!(departments.iter().all(|d| d.employees.is_empty()));

    test_case.end().await;
}

#[tokio::test]
async fn employee_lookups_are_balanced_over_instances() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;
    mount_employees(&first, 1, serde_json::json!([])).await;
    mount_employees(&second, 1, serde_json::json!([])).await;
    let mut app_settings = load_app_settings_for_testing();
    register_employee_service(&mut app_settings, &[&first, &second]);
    let test_case = TestCase::begin(app_settings, EnableTracing::No).await;
    test_case.insert_departments(&[(1, "Engineering")]).await;

    for _ in 0..2 {
        let response = test_case.list_departments_with_employees().await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    test_case.end().await;
}

#[tokio::test]
async fn listing_with_employees_fails_when_a_lookup_fails() {
    let employee_service = MockServer::start().await;
    mount_employees(&employee_service, 1, serde_json::json!([])).await;
    Mock::given(method("GET"))
        .and(path("/employees/departments/2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&employee_service)
        .await;
    let mut app_settings = load_app_settings_for_testing();
    register_employee_service(&mut app_settings, &[&employee_service]);
    let test_case = TestCase::begin(app_settings, EnableTracing::No).await;
    test_case
        .insert_departments(&[(1, "Engineering"), (2, "Sales")])
        .await;

    let response = test_case.list_departments_with_employees().await;
    let ResponseParts { status_code, body } = split_response(response).await;
    assert_eq!(status_code, StatusCode::BAD_GATEWAY);
    let body = serde_json::from_str::<serde_json::Value>(&body).unwrap();
    assert!(
        body.get("messages").is_some(),
        "No partial result must be returned: {}",
        body
    );

    test_case.end().await;
}

#[tokio::test]
async fn listing_with_employees_fails_without_employee_service_instances() {
    let app_settings = load_app_settings_for_testing();
    let test_case = TestCase::begin(app_settings, EnableTracing::No).await;
    test_case.insert_departments(&[(1, "Engineering")]).await;

    let response = test_case.list_departments_with_employees().await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    test_case.end().await;
}

#[tokio::test]
async fn listing_with_employees_on_an_empty_store_returns_an_empty_list() {
    let app_settings = load_app_settings_for_testing();
    let test_case = TestCase::begin(app_settings, EnableTracing::No).await;

    let response = test_case.list_departments_with_employees().await;
    let ResponseParts { status_code, body } = split_response(response).await;
    assert_eq!(status_code, StatusCode::OK);
    assert_eq!(body, "[]");

    test_case.end().await;
}
