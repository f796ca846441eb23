use morea_api::usecase::access::{
    ValidateCardInput, ValidateCardUseCase, ValidatePinInput, ValidatePinUseCase,
};
use morea_domain::access::AccessDecision;

use crate::helpers::{
    MockAccessLogRepo, MockCardRepo, MockDeviceRepo, MockReservationRepo, MockUserRepo, test_card,
    test_device, test_reservation, test_user,
};

// ── Card decision ────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_self_register_unknown_card_disabled_and_deny() {
    let cards = MockCardRepo::new(vec![], vec![], vec![]);
    let cards_handle = cards.cards_handle();
    let logs = MockAccessLogRepo::empty();
    let logs_handle = logs.logs_handle();

    let usecase = ValidateCardUseCase {
        cards,
        devices: MockDeviceRepo::new(vec![test_device("AA:BB:CC:DD:EE:FF", &["staff"])]),
        access_logs: logs,
    };

    let decision = usecase
        .execute(ValidateCardInput {
            card_hex: "AB12".to_owned(),
            mac_address: "AA:BB:CC:DD:EE:FF".to_owned(),
        })
        .await
        .unwrap();

    assert_eq!(decision, AccessDecision::Unauthorized);
    assert_eq!(decision.to_legacy_string(), "Unauthorized");

    let registered = cards_handle.lock().unwrap();
    assert_eq!(registered.len(), 1);
    assert_eq!(registered[0].card_id, "AB12");
    assert!(!registered[0].permission);
    // Unknown card never resolves a user, so no audit row.
    assert!(logs_handle.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_register_unknown_card_only_once_across_repeated_scans() {
    let cards = MockCardRepo::new(vec![], vec![], vec![]);
    let cards_handle = cards.cards_handle();

    let usecase = ValidateCardUseCase {
        cards,
        devices: MockDeviceRepo::empty(),
        access_logs: MockAccessLogRepo::empty(),
    };

    for _ in 0..3 {
        let decision = usecase
            .execute(ValidateCardInput {
                card_hex: "AB12".to_owned(),
                mac_address: "AA:BB:CC:DD:EE:FF".to_owned(),
            })
            .await
            .unwrap();
        assert_eq!(decision, AccessDecision::Unauthorized);
    }

    // First scan registers it; later scans find the (still disabled) card.
    assert_eq!(cards_handle.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_deny_disabled_card_without_logging() {
    let user = test_user("alice", &["staff"]);
    let card = test_card("AB12", false);
    let logs = MockAccessLogRepo::empty();
    let logs_handle = logs.logs_handle();

    let usecase = ValidateCardUseCase {
        cards: MockCardRepo::new(
            vec![card.clone()],
            vec![(user.user.id, card.id)],
            vec![user],
        ),
        devices: MockDeviceRepo::new(vec![test_device("AA:BB:CC:DD:EE:FF", &["staff"])]),
        access_logs: logs,
    };

    let decision = usecase
        .execute(ValidateCardInput {
            card_hex: "AB12".to_owned(),
            mac_address: "AA:BB:CC:DD:EE:FF".to_owned(),
        })
        .await
        .unwrap();

    assert_eq!(decision, AccessDecision::Unauthorized);
    assert!(logs_handle.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_deny_enabled_card_from_unknown_device() {
    let user = test_user("alice", &["staff"]);
    let card = test_card("AB12", true);

    let usecase = ValidateCardUseCase {
        cards: MockCardRepo::new(
            vec![card.clone()],
            vec![(user.user.id, card.id)],
            vec![user],
        ),
        devices: MockDeviceRepo::empty(),
        access_logs: MockAccessLogRepo::empty(),
    };

    let decision = usecase
        .execute(ValidateCardInput {
            card_hex: "AB12".to_owned(),
            mac_address: "11:22:33:44:55:66".to_owned(),
        })
        .await
        .unwrap();

    assert_eq!(decision, AccessDecision::Unauthorized);
}

#[tokio::test]
async fn should_deny_enabled_card_with_no_linked_user() {
    let card = test_card("AB12", true);

    let usecase = ValidateCardUseCase {
        cards: MockCardRepo::new(vec![card], vec![], vec![]),
        devices: MockDeviceRepo::new(vec![test_device("AA:BB:CC:DD:EE:FF", &["staff"])]),
        access_logs: MockAccessLogRepo::empty(),
    };

    let decision = usecase
        .execute(ValidateCardInput {
            card_hex: "AB12".to_owned(),
            mac_address: "AA:BB:CC:DD:EE:FF".to_owned(),
        })
        .await
        .unwrap();

    assert_eq!(decision, AccessDecision::Unauthorized);
}

#[tokio::test]
async fn should_grant_on_role_intersection_and_log_exactly_once() {
    let user = test_user("alice", &["staff", "electronics"]);
    let user_id = user.user.id;
    let card = test_card("AB12", true);
    let device = test_device("AA:BB:CC:DD:EE:FF", &["staff"]);
    let device_id = device.device.id;
    let logs = MockAccessLogRepo::empty();
    let logs_handle = logs.logs_handle();

    let usecase = ValidateCardUseCase {
        cards: MockCardRepo::new(vec![card.clone()], vec![(user_id, card.id)], vec![user]),
        devices: MockDeviceRepo::new(vec![device]),
        access_logs: logs,
    };

    let decision = usecase
        .execute(ValidateCardInput {
            card_hex: "AB12".to_owned(),
            mac_address: "AA:BB:CC:DD:EE:FF".to_owned(),
        })
        .await
        .unwrap();

    assert_eq!(
        decision,
        AccessDecision::Authorized {
            username: "alice".to_owned()
        }
    );
    assert_eq!(decision.to_legacy_string(), "Authorized?first_name=alice");

    let logged = logs_handle.lock().unwrap();
    assert_eq!(logged.len(), 1);
    assert_eq!(logged[0].user_id, user_id);
    assert_eq!(logged[0].device_id, device_id);
    assert!(logged[0].permission);
}

#[tokio::test]
async fn should_deny_on_disjoint_roles_and_still_log_once() {
    let user = test_user("bob", &["cleaning"]);
    let user_id = user.user.id;
    let card = test_card("CD34", true);
    let logs = MockAccessLogRepo::empty();
    let logs_handle = logs.logs_handle();

    let usecase = ValidateCardUseCase {
        cards: MockCardRepo::new(vec![card.clone()], vec![(user_id, card.id)], vec![user]),
        devices: MockDeviceRepo::new(vec![test_device("AA:BB:CC:DD:EE:FF", &["staff"])]),
        access_logs: logs,
    };

    let decision = usecase
        .execute(ValidateCardInput {
            card_hex: "CD34".to_owned(),
            mac_address: "AA:BB:CC:DD:EE:FF".to_owned(),
        })
        .await
        .unwrap();

    assert_eq!(decision, AccessDecision::Unauthorized);

    let logged = logs_handle.lock().unwrap();
    assert_eq!(logged.len(), 1);
    assert!(!logged[0].permission);
}

// ── PIN decision ─────────────────────────────────────────────────────────────

fn user_with_pin(username: &str, pin: &str, roles: &[&str]) -> morea_api::domain::types::UserWithRoles {
    let mut user = test_user(username, roles);
    user.user.access_pin = Some(pin.to_owned());
    user
}

#[tokio::test]
async fn should_deny_unknown_pin() {
    let usecase = ValidatePinUseCase {
        devices: MockDeviceRepo::new(vec![test_device("AA:BB:CC:DD:EE:FF", &["staff"])]),
        users: MockUserRepo::empty(),
        reservations: MockReservationRepo::empty(),
        access_logs: MockAccessLogRepo::empty(),
    };

    let decision = usecase
        .execute(ValidatePinInput {
            pin: "9999".to_owned(),
            mac_address: "AA:BB:CC:DD:EE:FF".to_owned(),
        })
        .await
        .unwrap();

    assert_eq!(decision, AccessDecision::Unauthorized);
}

#[tokio::test]
async fn should_deny_inactive_user_without_logging() {
    let mut user = user_with_pin("carol", "1234", &["staff"]);
    user.user.is_active = false;
    let logs = MockAccessLogRepo::empty();
    let logs_handle = logs.logs_handle();

    let usecase = ValidatePinUseCase {
        devices: MockDeviceRepo::new(vec![test_device("AA:BB:CC:DD:EE:FF", &["staff"])]),
        users: MockUserRepo::new(vec![user]),
        reservations: MockReservationRepo::empty(),
        access_logs: logs,
    };

    let decision = usecase
        .execute(ValidatePinInput {
            pin: "1234".to_owned(),
            mac_address: "AA:BB:CC:DD:EE:FF".to_owned(),
        })
        .await
        .unwrap();

    assert_eq!(decision, AccessDecision::Unauthorized);
    assert!(logs_handle.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_grant_superuser_pin_regardless_of_device_roles() {
    let user = user_with_pin("root", "4321", &["superuser"]);
    let logs = MockAccessLogRepo::empty();
    let logs_handle = logs.logs_handle();

    let usecase = ValidatePinUseCase {
        devices: MockDeviceRepo::new(vec![test_device("AA:BB:CC:DD:EE:FF", &[])]),
        users: MockUserRepo::new(vec![user]),
        reservations: MockReservationRepo::empty(),
        access_logs: logs,
    };

    let decision = usecase
        .execute(ValidatePinInput {
            pin: "4321".to_owned(),
            mac_address: "AA:BB:CC:DD:EE:FF".to_owned(),
        })
        .await
        .unwrap();

    assert_eq!(
        decision,
        AccessDecision::Authorized {
            username: "root".to_owned()
        }
    );
    let logged = logs_handle.lock().unwrap();
    assert_eq!(logged.len(), 1);
    assert!(logged[0].permission);
}

#[tokio::test]
async fn should_grant_pin_via_active_reservation_when_roles_disjoint() {
    let user = user_with_pin("dave", "5678", &["member"]);
    let user_id = user.user.id;
    let lab_id = uuid::Uuid::new_v4();
    let mut device = test_device("AA:BB:CC:DD:EE:FF", &["staff"]);
    device.device.lab_id = Some(lab_id);
    let logs = MockAccessLogRepo::empty();
    let logs_handle = logs.logs_handle();

    let usecase = ValidatePinUseCase {
        devices: MockDeviceRepo::new(vec![device]),
        users: MockUserRepo::new(vec![user]),
        reservations: MockReservationRepo::new(vec![test_reservation(user_id, lab_id, 1, 1)]),
        access_logs: logs,
    };

    let decision = usecase
        .execute(ValidatePinInput {
            pin: "5678".to_owned(),
            mac_address: "AA:BB:CC:DD:EE:FF".to_owned(),
        })
        .await
        .unwrap();

    assert_eq!(
        decision,
        AccessDecision::Authorized {
            username: "dave".to_owned()
        }
    );
    assert_eq!(logs_handle.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_deny_pin_when_reservation_expired_and_log_denial() {
    let user = user_with_pin("dave", "5678", &["member"]);
    let user_id = user.user.id;
    let lab_id = uuid::Uuid::new_v4();
    let mut device = test_device("AA:BB:CC:DD:EE:FF", &["staff"]);
    device.device.lab_id = Some(lab_id);
    let logs = MockAccessLogRepo::empty();
    let logs_handle = logs.logs_handle();

    // Window ended two hours ago.
    let usecase = ValidatePinUseCase {
        devices: MockDeviceRepo::new(vec![device]),
        users: MockUserRepo::new(vec![user]),
        reservations: MockReservationRepo::new(vec![test_reservation(user_id, lab_id, 4, -2)]),
        access_logs: logs,
    };

    let decision = usecase
        .execute(ValidatePinInput {
            pin: "5678".to_owned(),
            mac_address: "AA:BB:CC:DD:EE:FF".to_owned(),
        })
        .await
        .unwrap();

    assert_eq!(decision, AccessDecision::Unauthorized);
    let logged = logs_handle.lock().unwrap();
    assert_eq!(logged.len(), 1);
    assert!(!logged[0].permission);
}
