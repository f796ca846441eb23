use chrono::{Duration, Utc};
use uuid::Uuid;

use morea_api::error::ApiError;
use morea_api::usecase::reservation::{CreateReservationInput, CreateReservationUseCase};
use morea_api::usecase::session::{LoginInput, LoginUseCase, SignupInput, SignupUseCase};
use morea_auth::token::validate_session_token;

use crate::helpers::{
    MockLabRepo, MockReservationRepo, MockUserRepo, TEST_JWT_SECRET, test_lab, test_reservation,
    test_user,
};

fn user_with_password(username: &str, password: &str, roles: &[&str]) -> morea_api::domain::types::UserWithRoles {
    let mut user = test_user(username, roles);
    // Minimum cost keeps the test fast; production uses DEFAULT_COST.
    user.user.password_hash = bcrypt::hash(password, 4).unwrap();
    user
}

// ── Login ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_login_and_issue_validatable_session_token() {
    let user = user_with_password("alice", "hunter2", &["staff"]);
    let user_id = user.user.id;

    let usecase = LoginUseCase {
        users: MockUserRepo::new(vec![user]),
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    };

    let out = usecase
        .execute(LoginInput {
            email: Some("alice@example.com".to_owned()),
            username: None,
            password: "hunter2".to_owned(),
        })
        .await
        .unwrap();

    assert_eq!(out.user.id, user_id);
    assert_eq!(out.roles, vec!["staff".to_owned()]);

    let info = validate_session_token(&out.token, TEST_JWT_SECRET).unwrap();
    assert_eq!(info.user_id, user_id);
    assert_eq!(info.username, "alice");
    assert_eq!(info.roles, vec!["staff".to_owned()]);
}

#[tokio::test]
async fn should_reject_wrong_password() {
    let usecase = LoginUseCase {
        users: MockUserRepo::new(vec![user_with_password("alice", "hunter2", &[])]),
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    };

    let result = usecase
        .execute(LoginInput {
            email: Some("alice@example.com".to_owned()),
            username: None,
            password: "wrong".to_owned(),
        })
        .await;

    assert!(matches!(result, Err(ApiError::InvalidCredentials)));
}

#[tokio::test]
async fn should_reject_unknown_email() {
    let usecase = LoginUseCase {
        users: MockUserRepo::empty(),
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    };

    let result = usecase
        .execute(LoginInput {
            email: Some("nobody@example.com".to_owned()),
            username: None,
            password: "hunter2".to_owned(),
        })
        .await;

    assert!(matches!(result, Err(ApiError::InvalidCredentials)));
}

#[tokio::test]
async fn should_reject_deactivated_account() {
    let mut user = user_with_password("alice", "hunter2", &[]);
    user.user.is_active = false;

    let usecase = LoginUseCase {
        users: MockUserRepo::new(vec![user]),
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    };

    let result = usecase
        .execute(LoginInput {
            email: Some("alice@example.com".to_owned()),
            username: None,
            password: "hunter2".to_owned(),
        })
        .await;

    assert!(matches!(result, Err(ApiError::InvalidCredentials)));
}

#[tokio::test]
async fn should_login_by_username() {
    let user = user_with_password("alice", "hunter2", &[]);
    let user_id = user.user.id;

    let usecase = LoginUseCase {
        users: MockUserRepo::new(vec![user]),
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    };

    let out = usecase
        .execute(LoginInput {
            email: None,
            username: Some("alice".to_owned()),
            password: "hunter2".to_owned(),
        })
        .await
        .unwrap();

    assert_eq!(out.user.id, user_id);
}

// ── Signup ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_signup_new_member_as_superuser() {
    let admin = test_user("root", &["superuser"]);
    let lab = test_lab("electronics");
    let lab_id = lab.id;

    let users = MockUserRepo::new(vec![admin.clone()]);
    let users_handle = users.users_handle();
    let labs = MockLabRepo::new(vec![lab], vec![], vec![]);
    let members = labs.members_handle();

    let usecase = SignupUseCase { users, labs };

    let created = usecase
        .execute(SignupInput {
            actor_id: admin.user.id,
            actor_roles: admin.role_names.clone(),
            username: "newbie".to_owned(),
            email: "newbie@example.com".to_owned(),
            password: "secret123".to_owned(),
            access_pin: Some("1234".to_owned()),
            lab_ids: vec![lab_id],
        })
        .await
        .unwrap();

    assert!(created.is_active);
    assert!(bcrypt::verify("secret123", &created.password_hash).unwrap());
    assert_eq!(users_handle.lock().unwrap().len(), 2);

    let members = members.lock().unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].user_id, created.id);
    assert_eq!(members[0].lab_id, lab_id);
    assert!(!members[0].is_staff);
}

#[tokio::test]
async fn should_allow_lab_staff_to_signup_into_their_own_lab() {
    let staff = test_user("staffer", &[]);
    let lab = test_lab("electronics");
    let lab_id = lab.id;
    let membership = morea_api::domain::types::LabMember {
        user_id: staff.user.id,
        lab_id,
        is_staff: true,
    };

    let usecase = SignupUseCase {
        users: MockUserRepo::new(vec![staff.clone()]),
        labs: MockLabRepo::new(vec![lab], vec![membership], vec![]),
    };

    let created = usecase
        .execute(SignupInput {
            actor_id: staff.user.id,
            actor_roles: vec![],
            username: "newbie".to_owned(),
            email: "newbie@example.com".to_owned(),
            password: "secret123".to_owned(),
            access_pin: None,
            lab_ids: vec![lab_id],
        })
        .await
        .unwrap();

    assert_eq!(created.username, "newbie");
}

#[tokio::test]
async fn should_forbid_staff_from_signup_into_foreign_lab() {
    let staff = test_user("staffer", &[]);
    let own_lab = test_lab("electronics");
    let other_lab = test_lab("chemistry");
    let other_lab_id = other_lab.id;
    let membership = morea_api::domain::types::LabMember {
        user_id: staff.user.id,
        lab_id: own_lab.id,
        is_staff: true,
    };

    let usecase = SignupUseCase {
        users: MockUserRepo::new(vec![staff.clone()]),
        labs: MockLabRepo::new(vec![own_lab, other_lab], vec![membership], vec![]),
    };

    let result = usecase
        .execute(SignupInput {
            actor_id: staff.user.id,
            actor_roles: vec![],
            username: "newbie".to_owned(),
            email: "newbie@example.com".to_owned(),
            password: "secret123".to_owned(),
            access_pin: None,
            lab_ids: vec![other_lab_id],
        })
        .await;

    assert!(matches!(result, Err(ApiError::Forbidden)));
}

#[tokio::test]
async fn should_reject_duplicate_email() {
    let admin = test_user("root", &["superuser"]);
    let existing = test_user("alice", &[]);

    let usecase = SignupUseCase {
        users: MockUserRepo::new(vec![admin.clone(), existing]),
        labs: MockLabRepo::new(vec![], vec![], vec![]),
    };

    let result = usecase
        .execute(SignupInput {
            actor_id: admin.user.id,
            actor_roles: admin.role_names.clone(),
            username: "alice2".to_owned(),
            email: "alice@example.com".to_owned(),
            password: "secret123".to_owned(),
            access_pin: None,
            lab_ids: vec![],
        })
        .await;

    assert!(matches!(result, Err(ApiError::EmailAlreadyExists)));
}

#[tokio::test]
async fn should_reject_malformed_pin() {
    let admin = test_user("root", &["superuser"]);

    let usecase = SignupUseCase {
        users: MockUserRepo::new(vec![admin.clone()]),
        labs: MockLabRepo::new(vec![], vec![], vec![]),
    };

    let result = usecase
        .execute(SignupInput {
            actor_id: admin.user.id,
            actor_roles: admin.role_names.clone(),
            username: "newbie".to_owned(),
            email: "newbie@example.com".to_owned(),
            password: "secret123".to_owned(),
            access_pin: Some("12ab".to_owned()),
            lab_ids: vec![],
        })
        .await;

    assert!(matches!(result, Err(ApiError::InvalidPin)));
}

// ── Reservations ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_create_reservation_in_free_slot() {
    let lab = test_lab("electronics");
    let lab_id = lab.id;
    let reservations = MockReservationRepo::empty();
    let handle = reservations.reservations_handle();

    let usecase = CreateReservationUseCase {
        reservations,
        labs: MockLabRepo::new(vec![lab], vec![], vec![]),
    };

    let start = Utc::now() + Duration::hours(1);
    let created = usecase
        .execute(CreateReservationInput {
            user_id: Uuid::new_v4(),
            lab_id,
            start_time: start,
            end_time: start + Duration::hours(2),
        })
        .await
        .unwrap();

    assert_eq!(created.lab_id, lab_id);
    assert_eq!(handle.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_reject_inverted_time_range() {
    let lab = test_lab("electronics");
    let lab_id = lab.id;

    let usecase = CreateReservationUseCase {
        reservations: MockReservationRepo::empty(),
        labs: MockLabRepo::new(vec![lab], vec![], vec![]),
    };

    let start = Utc::now();
    let result = usecase
        .execute(CreateReservationInput {
            user_id: Uuid::new_v4(),
            lab_id,
            start_time: start,
            end_time: start - Duration::minutes(30),
        })
        .await;

    assert!(matches!(result, Err(ApiError::InvalidTimeRange)));
}

#[tokio::test]
async fn should_reject_overlapping_reservation() {
    let lab = test_lab("electronics");
    let lab_id = lab.id;
    let other_user = Uuid::new_v4();

    // Existing booking covers now-1h to now+1h.
    let usecase = CreateReservationUseCase {
        reservations: MockReservationRepo::new(vec![test_reservation(other_user, lab_id, 1, 1)]),
        labs: MockLabRepo::new(vec![lab], vec![], vec![]),
    };

    let result = usecase
        .execute(CreateReservationInput {
            user_id: Uuid::new_v4(),
            lab_id,
            start_time: Utc::now(),
            end_time: Utc::now() + Duration::hours(2),
        })
        .await;

    assert!(matches!(result, Err(ApiError::ReservationConflict)));
}

#[tokio::test]
async fn should_reject_reservation_for_unknown_lab() {
    let usecase = CreateReservationUseCase {
        reservations: MockReservationRepo::empty(),
        labs: MockLabRepo::new(vec![], vec![], vec![]),
    };

    let start = Utc::now();
    let result = usecase
        .execute(CreateReservationInput {
            user_id: Uuid::new_v4(),
            lab_id: Uuid::new_v4(),
            start_time: start,
            end_time: start + Duration::hours(1),
        })
        .await;

    assert!(matches!(result, Err(ApiError::LabNotFound)));
}
