use ciborium::value::Value as CborValue;

use crate::passkey::errors::PasskeyError;

/// `none` attestation carries no statement to check.
pub(super) fn verify_none_attestation(att_stmt: &[(CborValue, CborValue)]) -> Result<(), PasskeyError> {
    if !att_stmt.is_empty() {
        return Err(PasskeyError::Format(
            "attStmt must be empty for none attestation".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_attestation_requires_empty_statement() {
        assert!(verify_none_attestation(&[]).is_ok());

        let stmt = vec![(
            CborValue::Text("alg".to_string()),
            CborValue::Integer(1.into()),
        )];
        match verify_none_attestation(&stmt) {
            Err(PasskeyError::Format(msg)) => assert!(msg.contains("attStmt must be empty")),
            other => panic!("Expected PasskeyError::Format, got {other:?}"),
        }
    }
}
