//! Subcommand definitions and their execution.
//!
//! Every command reads its input from a reader and writes its result to a
//! writer, so the same code runs against stdin/stdout and against buffers in
//! tests. Nothing written here or logged here contains key material.

use std::io::{Read, Write};

use clap::{Parser, Subcommand, ValueEnum};
use common::protocol::KeyResponse;
use common::ServiceError;
use envelope::{CipherSuite, EnvelopeCipher};
use rbac::MemoryAuthManager;
use tracing::info;

use crate::config::Config;

/// Authenticated AES-CBC envelopes, RSA helpers, and RBAC seeding.
#[derive(Debug, Parser)]
#[command(name = "envelope", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print a fresh base64 key.
    Keygen {
        /// Suite to generate for; defaults to CIPHER_SUITE.
        #[arg(long)]
        suite: Option<CipherSuite>,
        /// Print a JSON document instead of the bare key.
        #[arg(long)]
        json: bool,
    },
    /// Encrypt stdin into an envelope.
    Encode {
        /// Encrypt stdin bytes as-is instead of parsing them as JSON.
        #[arg(long)]
        raw: bool,
    },
    /// Verify and decrypt an envelope read from stdin.
    Decode {
        /// Write the decrypted bytes as-is instead of pretty JSON.
        #[arg(long)]
        raw: bool,
    },
    /// RSA PKCS#1 v1.5 operations over stdin.
    Rsa {
        #[arg(value_enum)]
        op: RsaOp,
    },
    /// Seed the default roles and permissions and print the resulting graph.
    SeedRbac,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RsaOp {
    PublicEncrypt,
    PrivateDecrypt,
    PrivateEncrypt,
    PublicDecrypt,
}

/// Execute `command`.
///
/// # Errors
///
/// Returns a [`ServiceError`] describing the first failure.
pub fn run<R: Read, W: Write>(
    command: &Command,
    cfg: &Config,
    input: &mut R,
    out: &mut W,
) -> Result<(), ServiceError> {
    match command {
        Command::Keygen { suite, json } => {
            let suite = match suite {
                Some(s) => *s,
                None => cfg
                    .suite()
                    .map_err(|e| ServiceError::Unavailable(format!("{e:#}")))?,
            };
            let key = EnvelopeCipher::generate_key(suite);
            if *json {
                let doc = KeyResponse {
                    suite: suite.to_string(),
                    key,
                };
                write_json(out, &doc)?;
            } else {
                write_line(out, key.as_bytes())?;
            }
            info!(suite = %suite, "key generated");
        }
        Command::Encode { raw } => {
            let cipher = cfg.cipher()?;
            let data = read_all(input)?;
            let envelope = if *raw {
                cipher.encode_raw(&data)?
            } else {
                let value: serde_json::Value = serde_json::from_slice(&data).map_err(|e| {
                    ServiceError::BadRequest(format!("input is not valid JSON: {e}"))
                })?;
                cipher.encode(&value)?
            };
            write_line(out, envelope.as_bytes())?;
            info!(suite = %cipher.suite(), raw = *raw, "envelope encoded");
        }
        Command::Decode { raw } => {
            let cipher = cfg.cipher()?;
            let envelope = read_text(input)?;
            if *raw {
                let plaintext = cipher.decode_raw(&envelope)?;
                write_bytes(out, &plaintext)?;
            } else {
                let value: serde_json::Value = cipher.decode(&envelope)?;
                write_json(out, &value)?;
            }
            info!(suite = %cipher.suite(), raw = *raw, "envelope decoded");
        }
        Command::Rsa { op } => {
            run_rsa(*op, cfg, input, out)?;
            info!(op = ?op, "RSA operation completed");
        }
        Command::SeedRbac => {
            let mut store = MemoryAuthManager::new();
            rbac::seed(&mut store).map_err(|e| ServiceError::Internal(e.to_string()))?;
            write_json(out, &store.snapshot())?;
            info!("RBAC graph seeded");
        }
    }
    Ok(())
}

fn run_rsa<R: Read, W: Write>(
    op: RsaOp,
    cfg: &Config,
    input: &mut R,
    out: &mut W,
) -> Result<(), ServiceError> {
    match op {
        RsaOp::PublicEncrypt => {
            let data = read_all(input)?;
            let encrypted = cfg.rsa_public()?.public_encrypt_raw(&data)?;
            write_line(out, encrypted.as_bytes())
        }
        RsaOp::PrivateEncrypt => {
            let data = read_all(input)?;
            let encrypted = cfg.rsa_private()?.private_encrypt_raw(&data)?;
            write_line(out, encrypted.as_bytes())
        }
        RsaOp::PrivateDecrypt => {
            let data = read_text(input)?;
            let decrypted = cfg.rsa_private()?.private_decrypt_raw(&data)?;
            write_bytes(out, &decrypted)
        }
        RsaOp::PublicDecrypt => {
            let data = read_text(input)?;
            let decrypted = cfg.rsa_public()?.public_decrypt_raw(&data)?;
            write_bytes(out, &decrypted)
        }
    }
}

fn read_all<R: Read>(input: &mut R) -> Result<Vec<u8>, ServiceError> {
    let mut buf = Vec::new();
    input
        .read_to_end(&mut buf)
        .map_err(|e| ServiceError::Internal(format!("failed to read input: {e}")))?;
    Ok(buf)
}

fn read_text<R: Read>(input: &mut R) -> Result<String, ServiceError> {
    let bytes = read_all(input)?;
    String::from_utf8(bytes)
        .map(|s| s.trim().to_owned())
        .map_err(|_| ServiceError::BadRequest("input is not valid UTF-8".into()))
}

fn write_bytes<W: Write>(out: &mut W, bytes: &[u8]) -> Result<(), ServiceError> {
    out.write_all(bytes)
        .and_then(|()| out.flush())
        .map_err(|e| ServiceError::Internal(format!("failed to write output: {e}")))
}

fn write_line<W: Write>(out: &mut W, bytes: &[u8]) -> Result<(), ServiceError> {
    write_bytes(out, bytes)?;
    write_bytes(out, b"\n")
}

fn write_json<W: Write, T: serde::Serialize>(out: &mut W, doc: &T) -> Result<(), ServiceError> {
    let json = serde_json::to_vec_pretty(doc)
        .map_err(|e| ServiceError::Internal(format!("failed to render JSON: {e}")))?;
    write_line(out, &json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::config_with_key;
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use clap::CommandFactory;

    fn exec(command: Command, cfg: &Config, input: &[u8]) -> Result<Vec<u8>, ServiceError> {
        let mut out = Vec::new();
        run(&command, cfg, &mut &input[..], &mut out)?;
        Ok(out)
    }

    fn keyed(suite: CipherSuite) -> Config {
        let key = EnvelopeCipher::generate_key(suite);
        config_with_key(Some(&key), suite.as_str())
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_subcommands() {
        let cli = Cli::try_parse_from(["envelope", "keygen", "--suite", "aes-256-cbc"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Keygen {
                suite: Some(CipherSuite::Aes256Cbc),
                json: false
            }
        ));
        let cli = Cli::try_parse_from(["envelope", "rsa", "public-decrypt"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Rsa {
                op: RsaOp::PublicDecrypt
            }
        ));
        assert!(Cli::try_parse_from(["envelope", "keygen", "--suite", "rot13"]).is_err());
    }

    #[test]
    fn keygen_uses_configured_suite() {
        let cfg = config_with_key(None, "AES-256-CBC");
        let out = exec(Command::Keygen { suite: None, json: false }, &cfg, b"").unwrap();
        let key = String::from_utf8(out).unwrap();
        assert_eq!(STANDARD.decode(key.trim()).unwrap().len(), 32);
    }

    #[test]
    fn keygen_json_document() {
        let cfg = config_with_key(None, "AES-256-CBC");
        let out = exec(
            Command::Keygen {
                suite: Some(CipherSuite::Aes128Cbc),
                json: true,
            },
            &cfg,
            b"",
        )
        .unwrap();
        let doc: KeyResponse = serde_json::from_slice(&out).unwrap();
        assert_eq!(doc.suite, "AES-128-CBC");
        assert_eq!(STANDARD.decode(doc.key).unwrap().len(), 16);
    }

    #[test]
    fn encode_then_decode_json() {
        let cfg = keyed(CipherSuite::Aes128Cbc);
        let envelope = exec(Command::Encode { raw: false }, &cfg, br#"{"a":[1,2]}"#).unwrap();
        let out = exec(Command::Decode { raw: false }, &cfg, &envelope).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value, serde_json::json!({"a": [1, 2]}));
    }

    #[test]
    fn encode_then_decode_raw() {
        let cfg = keyed(CipherSuite::Aes256Cbc);
        let envelope = exec(Command::Encode { raw: true }, &cfg, b"\x00\x01binary").unwrap();
        let out = exec(Command::Decode { raw: true }, &cfg, &envelope).unwrap();
        assert_eq!(out, b"\x00\x01binary");
    }

    #[test]
    fn encode_rejects_non_json_input() {
        let cfg = keyed(CipherSuite::Aes128Cbc);
        let err = exec(Command::Encode { raw: false }, &cfg, b"not json").unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(_)));
    }

    #[test]
    fn decode_under_other_key_is_rejected() {
        let a = keyed(CipherSuite::Aes128Cbc);
        let b = keyed(CipherSuite::Aes128Cbc);
        let envelope = exec(Command::Encode { raw: true }, &a, b"x").unwrap();
        let err = exec(Command::Decode { raw: true }, &b, &envelope).unwrap_err();
        assert!(matches!(err, ServiceError::Rejected(_)));
        assert_eq!(err.exit_code(), 65);
    }

    #[test]
    fn decode_of_garbage_is_bad_request() {
        let cfg = keyed(CipherSuite::Aes128Cbc);
        let err = exec(Command::Decode { raw: true }, &cfg, b"garbage").unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(_)));
    }

    #[test]
    fn encode_without_key_is_unavailable() {
        let cfg = config_with_key(None, "AES-128-CBC");
        let err = exec(Command::Encode { raw: true }, &cfg, b"x").unwrap_err();
        assert!(matches!(err, ServiceError::Unavailable(_)));
    }

    #[test]
    fn rsa_without_key_files_is_unavailable() {
        let mut cfg = config_with_key(None, "AES-128-CBC");
        cfg.rsa_private_key_path = "/nonexistent/private.pem".into();
        let err = exec(
            Command::Rsa {
                op: RsaOp::PrivateEncrypt,
            },
            &cfg,
            b"x",
        )
        .unwrap_err();
        assert_eq!(err.exit_code(), 78);
    }

    #[test]
    fn seed_rbac_prints_graph() {
        let cfg = config_with_key(None, "AES-128-CBC");
        let out = exec(Command::SeedRbac, &cfg, b"").unwrap();
        let snap: common::protocol::RbacSnapshot = serde_json::from_slice(&out).unwrap();
        assert_eq!(snap.items.len(), 4);
        assert_eq!(snap.assignments.len(), 2);
        let admin = snap.items.iter().find(|i| i.name == "admin").unwrap();
        assert_eq!(admin.children, vec!["author", "updatePost"]);
    }
}
