// tests/api_tests.rs

mod common;

use common::{spawn_app, two_question_quiz};
use serde_json::{Value, json};

#[tokio::test]
async fn health_check_works() {
    let app = spawn_app().await;

    let response = app
        .api_client
        .get(app.url("/api/health"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn unknown_path_is_404() {
    let app = spawn_app().await;

    let response = app
        .api_client
        .get(app.url("/random_path_that_does_not_exist"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn register_and_login_flow() {
    let app = spawn_app().await;

    // Register returns a token and never exposes the hash
    let response = app
        .api_client
        .post(app.url("/api/auth/register"))
        .json(&json!({
            "name": "Ada",
            "email": "  Ada@Example.com ",
            "password": "password123"
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 201);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["type"], "Bearer");
    assert_eq!(body["user"]["email"], "ada@example.com");
    assert_eq!(body["user"]["role"], "student");
    assert!(body["user"].get("passwordHash").is_none());
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));

    // Login with different casing
    let response = app
        .api_client
        .post(app.url("/api/auth/login"))
        .json(&json!({ "email": "ADA@example.com", "password": "password123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    let token = body["token"].as_str().unwrap().to_string();

    // The token resolves to the same user
    let response = app
        .api_client
        .get(app.url("/api/auth/me"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let me: Value = response.json().await.unwrap();
    assert_eq!(me["name"], "Ada");
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let app = spawn_app().await;
    app.api_client
        .post(app.url("/api/auth/register"))
        .json(&json!({ "name": "Bob", "email": "bob@example.com", "password": "password123" }))
        .send()
        .await
        .unwrap();

    let wrong_password = app
        .api_client
        .post(app.url("/api/auth/login"))
        .json(&json!({ "email": "bob@example.com", "password": "nope-nope" }))
        .send()
        .await
        .unwrap();
    let unknown_email = app
        .api_client
        .post(app.url("/api/auth/login"))
        .json(&json!({ "email": "nobody@example.com", "password": "password123" }))
        .send()
        .await
        .unwrap();

    assert_eq!(wrong_password.status().as_u16(), 401);
    assert_eq!(unknown_email.status().as_u16(), 401);

    let a: Value = wrong_password.json().await.unwrap();
    let b: Value = unknown_email.json().await.unwrap();
    assert_eq!(a, b);
    assert_eq!(a["kind"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn register_rejects_bad_input() {
    let app = spawn_app().await;

    let cases = [
        (json!({ "name": "", "email": "a@example.com", "password": "password123" }), "VALIDATION_ERROR"),
        (json!({ "name": "A", "email": "not-an-email", "password": "password123" }), "VALIDATION_ERROR"),
        (json!({ "name": "A", "email": "a@example.com", "password": "12345" }), "WEAK_CREDENTIAL"),
    ];

    for (payload, kind) in cases {
        let response = app
            .api_client
            .post(app.url("/api/auth/register"))
            .json(&payload)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 400, "payload: {}", payload);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["kind"], kind, "payload: {}", payload);
    }
}

#[tokio::test]
async fn duplicate_email_differing_in_case_conflicts() {
    let app = spawn_app().await;

    let first = app
        .api_client
        .post(app.url("/api/auth/register"))
        .json(&json!({ "name": "One", "email": "same@example.com", "password": "password123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(first.status().as_u16(), 201);

    let second = app
        .api_client
        .post(app.url("/api/auth/register"))
        .json(&json!({ "name": "Two", "email": " SAME@Example.com", "password": "password123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(second.status().as_u16(), 409);
    let body: Value = second.json().await.unwrap();
    assert_eq!(body["kind"], "CONFLICT");
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let app = spawn_app().await;

    let missing = app.api_client.get(app.url("/api/auth/me")).send().await.unwrap();
    assert_eq!(missing.status().as_u16(), 401);

    let garbage = app
        .api_client
        .get(app.url("/api/results/me"))
        .bearer_auth("not.a.token")
        .send()
        .await
        .unwrap();
    assert_eq!(garbage.status().as_u16(), 401);
}

#[tokio::test]
async fn update_profile_changes_name_and_password() {
    let app = spawn_app().await;
    let (token, _) = app.register("student").await;

    let response = app
        .api_client
        .put(app.url("/api/auth/me"))
        .bearer_auth(&token)
        .json(&json!({ "name": "Renamed", "email": "renamed@example.com", "password": "newpassword" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["name"], "Renamed");
    assert_eq!(body["role"], "student");

    let login = app
        .api_client
        .post(app.url("/api/auth/login"))
        .json(&json!({ "email": "renamed@example.com", "password": "newpassword" }))
        .send()
        .await
        .unwrap();
    assert_eq!(login.status().as_u16(), 200);
}

#[tokio::test]
async fn students_cannot_author_quizzes() {
    let app = spawn_app().await;
    let (token, _) = app.register("student").await;

    let response = app
        .api_client
        .post(app.url("/api/quizzes"))
        .bearer_auth(&token)
        .json(&two_question_quiz("Nope"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 403);
}

#[tokio::test]
async fn quiz_creation_validates_questions() {
    let app = spawn_app().await;
    let (token, _) = app.register("teacher").await;

    let empty = app
        .api_client
        .post(app.url("/api/quizzes"))
        .bearer_auth(&token)
        .json(&json!({ "title": "Empty", "questions": [] }))
        .send()
        .await
        .unwrap();
    assert_eq!(empty.status().as_u16(), 400);

    // Second question points outside its options
    let out_of_range = app
        .api_client
        .post(app.url("/api/quizzes"))
        .bearer_auth(&token)
        .json(&json!({
            "title": "Broken",
            "questions": [
                { "text": "Q1", "options": ["a", "b"], "correctAnswerIndex": 0 },
                { "text": "Q2", "options": ["a", "b"], "correctAnswerIndex": 2 }
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(out_of_range.status().as_u16(), 400);
    let body: Value = out_of_range.json().await.unwrap();
    assert_eq!(body["kind"], "INVALID_QUESTION");
    assert_eq!(body["error"], "Invalid question at index 1");
}

#[tokio::test]
async fn answers_are_concealed_by_role() {
    let app = spawn_app().await;
    let (teacher, _) = app.register("teacher").await;
    let (student, _) = app.register("student").await;
    let quiz_id = app.create_quiz(&teacher, &two_question_quiz("Concealment")).await;

    // Student asking for answers still gets none
    let response = app
        .api_client
        .get(app.url(&format!("/api/quizzes/{}?includeAnswers=true", quiz_id)))
        .bearer_auth(&student)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["questions"].as_array().unwrap().len(), 2);
    for q in body["questions"].as_array().unwrap() {
        assert!(q.get("correctAnswerIndex").is_none());
        assert_eq!(q["options"].as_array().unwrap().len(), 4);
    }

    // Teacher without the flag: hidden
    let body: Value = app
        .api_client
        .get(app.url(&format!("/api/quizzes/{}", quiz_id)))
        .bearer_auth(&teacher)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(body["questions"][0].get("correctAnswerIndex").is_none());

    // Teacher with the flag: shown
    let body: Value = app
        .api_client
        .get(app.url(&format!("/api/quizzes/{}?includeAnswers=true", quiz_id)))
        .bearer_auth(&teacher)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["questions"][0]["correctAnswerIndex"], 1);
    assert_eq!(body["questions"][1]["correctAnswerIndex"], 2);
}

#[tokio::test]
async fn public_listing_hides_questions() {
    let app = spawn_app().await;
    let (teacher, _) = app.register("teacher").await;
    app.create_quiz(&teacher, &two_question_quiz("Listed")).await;

    let response = app.api_client.get(app.url("/api/quizzes")).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let body: Value = response.json().await.unwrap();
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Listed");
    assert_eq!(items[0]["questionCount"], 2);
    assert!(items[0].get("questions").is_none());
    assert_eq!(body["pagination"]["total"], 1);
}

#[tokio::test]
async fn missing_quiz_is_404() {
    let app = spawn_app().await;
    let (student, _) = app.register("student").await;

    let response = app
        .api_client
        .get(app.url("/api/quizzes/9999"))
        .bearer_auth(&student)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);

    let response = app.submit(&student, 9999, &[0]).await;
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn resubmission_overwrites_the_single_result() {
    let app = spawn_app().await;
    let (teacher, _) = app.register("teacher").await;
    let (student, _) = app.register("student").await;
    let quiz_id = app.create_quiz(&teacher, &two_question_quiz("Scoring")).await;

    // All correct
    let response = app.submit(&student, quiz_id, &[1, 2]).await;
    assert_eq!(response.status().as_u16(), 201);
    let first: Value = response.json().await.unwrap();
    assert_eq!(first["score"], 2);
    assert_eq!(first["total"], 2);

    // All wrong, same result row
    let response = app.submit(&student, quiz_id, &[0, 0]).await;
    assert_eq!(response.status().as_u16(), 200);
    let second: Value = response.json().await.unwrap();
    assert_eq!(second["score"], 0);
    assert_eq!(second["resultId"], first["resultId"]);

    // Correct again
    let response = app.submit(&student, quiz_id, &[1, 2]).await;
    assert_eq!(response.status().as_u16(), 200);
    let third: Value = response.json().await.unwrap();
    assert_eq!(third["score"], 2);

    let mine: Value = app
        .api_client
        .get(app.url("/api/results/me"))
        .bearer_auth(&student)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let mine = mine.as_array().unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["score"], 2);
    assert_eq!(mine[0]["total"], 2);
    assert_eq!(mine[0]["quizTitle"], "Scoring");
    assert_eq!(mine[0]["responses"][1]["selectedAnswerIndex"], 2);
    assert_eq!(mine[0]["responses"][1]["isCorrect"], true);
}

#[tokio::test]
async fn incomplete_submission_creates_nothing() {
    let app = spawn_app().await;
    let (teacher, _) = app.register("teacher").await;
    let (student, _) = app.register("student").await;
    let quiz_id = app.create_quiz(&teacher, &two_question_quiz("Incomplete")).await;

    let response = app.submit(&student, quiz_id, &[1]).await;
    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["kind"], "INCOMPLETE_SUBMISSION");

    let mine: Value = app
        .api_client
        .get(app.url("/api/results/me"))
        .bearer_auth(&student)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(mine.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn out_of_range_selection_scores_as_wrong() {
    let app = spawn_app().await;
    let (teacher, _) = app.register("teacher").await;
    let (student, _) = app.register("student").await;
    let quiz_id = app.create_quiz(&teacher, &two_question_quiz("Range")).await;

    let response = app.submit(&student, quiz_id, &[1, 42]).await;
    assert_eq!(response.status().as_u16(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["score"], 1);
}

#[tokio::test]
async fn concurrent_submissions_leave_one_result() {
    let app = spawn_app().await;
    let (teacher, _) = app.register("teacher").await;
    let (student, _) = app.register("student").await;
    let quiz_id = app.create_quiz(&teacher, &two_question_quiz("Race")).await;

    let (a, b) = tokio::join!(
        app.submit(&student, quiz_id, &[1, 2]),
        app.submit(&student, quiz_id, &[0, 0]),
    );
    let mut statuses = [a.status().as_u16(), b.status().as_u16()];
    statuses.sort();
    assert_eq!(statuses, [200, 201]);

    let attempts: Value = app
        .api_client
        .get(app.url(&format!("/api/results/quiz/{}", quiz_id)))
        .bearer_auth(&teacher)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(attempts.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn only_the_author_or_admin_edits_a_quiz() {
    let app = spawn_app().await;
    let (owner, _) = app.register("teacher").await;
    let (other, _) = app.register("teacher").await;
    let (admin, _) = app.register("admin").await;
    let quiz_id = app.create_quiz(&owner, &two_question_quiz("Owned")).await;

    let response = app
        .api_client
        .put(app.url(&format!("/api/quizzes/{}", quiz_id)))
        .bearer_auth(&other)
        .json(&json!({ "title": "Hijacked" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 403);

    let response = app
        .api_client
        .put(app.url(&format!("/api/quizzes/{}", quiz_id)))
        .bearer_auth(&owner)
        .json(&json!({ "title": "Renamed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["title"], "Renamed");
    assert_eq!(body["questions"].as_array().unwrap().len(), 2);

    let response = app
        .api_client
        .delete(app.url(&format!("/api/quizzes/{}", quiz_id)))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 204);
}

#[tokio::test]
async fn quiz_results_are_private_to_the_author() {
    let app = spawn_app().await;
    let (owner, _) = app.register("teacher").await;
    let (other, _) = app.register("teacher").await;
    let (student, _) = app.register("student").await;
    let quiz_id = app.create_quiz(&owner, &two_question_quiz("Private")).await;
    app.submit(&student, quiz_id, &[1, 0]).await;

    for token in [&other, &student] {
        let response = app
            .api_client
            .get(app.url(&format!("/api/results/quiz/{}", quiz_id)))
            .bearer_auth(token)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 403);
    }

    let body: Value = app
        .api_client
        .get(app.url(&format!("/api/results/quiz/{}", quiz_id)))
        .bearer_auth(&owner)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["userName"], "Test student");
    assert_eq!(entries[0]["percentage"], 50);
}
