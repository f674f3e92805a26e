//! Mapping of library errors onto [`ServiceError`].

use common::ServiceError;

use crate::asymmetric::RsaError;
use crate::crypto::CipherError;

impl From<CipherError> for ServiceError {
    fn from(err: CipherError) -> Self {
        match err {
            CipherError::KeyFormat { .. } => ServiceError::Unavailable(err.to_string()),
            CipherError::IncompleteData | CipherError::Payload(_) => {
                ServiceError::BadRequest(err.to_string())
            }
            CipherError::InvalidSignature | CipherError::Decryption => {
                ServiceError::Rejected(err.to_string())
            }
            CipherError::Encryption | CipherError::Framing(_) => {
                ServiceError::Internal(err.to_string())
            }
        }
    }
}

impl From<RsaError> for ServiceError {
    fn from(err: RsaError) -> Self {
        match err {
            RsaError::KeyFile { .. } | RsaError::KeyLoad { .. } | RsaError::MissingPrivateKey => {
                ServiceError::Unavailable(err.to_string())
            }
            RsaError::Encoding | RsaError::Payload(_) | RsaError::Encryption => {
                ServiceError::BadRequest(err.to_string())
            }
            RsaError::Decryption => ServiceError::Rejected(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::CipherSuite;

    #[test]
    fn cipher_errors_map_to_exit_codes() {
        let key = ServiceError::from(CipherError::KeyFormat {
            suite: CipherSuite::Aes128Cbc,
            expected: 16,
        });
        assert_eq!(key.exit_code(), 78);
        assert_eq!(ServiceError::from(CipherError::IncompleteData).code(), "bad_request");
        assert_eq!(ServiceError::from(CipherError::InvalidSignature).code(), "rejected");
        assert_eq!(ServiceError::from(CipherError::Decryption).code(), "rejected");
        assert_eq!(ServiceError::from(CipherError::Encryption).exit_code(), 70);
    }

    #[test]
    fn signature_error_reveals_nothing_more() {
        let e = ServiceError::from(CipherError::InvalidSignature);
        assert_eq!(e.to_string(), "rejected: the envelope signature is invalid");
    }

    #[test]
    fn rsa_errors_map_to_exit_codes() {
        assert_eq!(ServiceError::from(RsaError::MissingPrivateKey).exit_code(), 78);
        assert_eq!(ServiceError::from(RsaError::Encoding).code(), "bad_request");
        assert_eq!(ServiceError::from(RsaError::Decryption).code(), "rejected");
    }
}
