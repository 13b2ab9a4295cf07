//! Code and room-code validation.

use numble::{CODE_LEN, Code, RoomCode, ValidationError, validate};

#[test]
fn test_accepts_well_formed_code() {
    let code = validate("1234").expect("valid");
    assert_eq!(code.digits(), [1, 2, 3, 4]);
    assert_eq!(code.to_string(), "1234");
    assert_eq!(code.digits().len(), CODE_LEN);
}

#[test]
fn test_rejects_zero() {
    assert_eq!(validate("0123"), Err(ValidationError::DigitOutOfRange));
}

#[test]
fn test_rejects_duplicate() {
    assert_eq!(validate("1123"), Err(ValidationError::DuplicateDigit));
}

#[test]
fn test_rejects_wrong_length() {
    assert_eq!(validate("12"), Err(ValidationError::WrongLength));
    assert_eq!(validate("12345"), Err(ValidationError::WrongLength));
    assert_eq!(validate(""), Err(ValidationError::WrongLength));
}

#[test]
fn test_rejects_non_digits() {
    assert_eq!(validate("12a4"), Err(ValidationError::DigitOutOfRange));
    assert_eq!(validate("12 4"), Err(ValidationError::DigitOutOfRange));
}

#[test]
fn test_error_messages() {
    assert_eq!(ValidationError::WrongLength.to_string(), "wrong length");
    assert_eq!(ValidationError::DigitOutOfRange.to_string(), "digit out of range");
    assert_eq!(ValidationError::DuplicateDigit.to_string(), "duplicate digit");
}

#[test]
fn test_code_serde_uses_string_form() {
    let code: Code = "9721".parse().expect("valid");
    let json = serde_json::to_value(code).expect("encode");
    assert_eq!(json, serde_json::json!("9721"));
    let back: Code = serde_json::from_value(json).expect("decode");
    assert_eq!(back, code);
    assert!(serde_json::from_value::<Code>(serde_json::json!("9921")).is_err());
}

#[test]
fn test_room_code_parse_normalises_case() {
    let code = RoomCode::parse(" abcd-1234 ").expect("valid");
    assert_eq!(code.as_str(), "ABCD-1234");
}

#[test]
fn test_room_code_rejects_ambiguous_letters() {
    assert_eq!(RoomCode::parse("ABCO-1234"), Err(ValidationError::MalformedRoomCode));
    assert_eq!(RoomCode::parse("ABCI-1234"), Err(ValidationError::MalformedRoomCode));
    assert_eq!(RoomCode::parse("ABCD1234"), Err(ValidationError::MalformedRoomCode));
}

#[test]
fn test_generated_room_codes_parse() {
    for _ in 0..100 {
        let code = RoomCode::generate();
        assert_eq!(RoomCode::parse(code.as_str()).expect("valid"), code);
    }
}
