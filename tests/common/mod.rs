#![allow(dead_code)]

use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use assert_fs::TempDir;
use assert_fs::prelude::*;

pub const ALICE: &str = "AAAA111122223333";
pub const ALICE_SUBKEY: &str = "AAAA444455556666";
pub const BOB: &str = "BBBB111122223333";
pub const MALLORY: &str = "9999888877776666";
pub const PASSPHRASE: &str = "correct";

/// Stand-in for gpg that answers from fixed listings and reacts to
/// markers inside the message files it is given.
const FAKE_GPG: &str = r#"#!/usr/bin/env bash
args="$*"
last="${@: -1}"
status() { echo "[GNUPG:] $*" >&2; }

case "$args" in
  *--version*)
    echo "gpg (GnuPG) 2.4.4"
    exit 0
    ;;
  *--list-secret-keys*)
    cat <<'LISTING'
sec:u:255:22:AAAA111122223333:1700000000:::u:::scESC:::+:::ed25519:::0:
fpr:::::::::000000000000000000000000AAAA111122223333:
uid:u::::1700000000::H1::Alice Example <alice@example.com>::::::::::0:
ssb:u:255:18:AAAA444455556666:1700000000::::::e:::+:::cv25519::
fpr:::::::::000000000000000000000000AAAA444455556666:
LISTING
    exit 0
    ;;
  *--list-keys*)
    cat <<'LISTING'
pub:u:255:22:AAAA111122223333:1700000000:::u:::scESC::::::ed25519:::0:
fpr:::::::::000000000000000000000000AAAA111122223333:
uid:u::::1700000000::H1::Alice Example <alice@example.com>::::::::::0:
sub:u:255:18:AAAA444455556666:1700000000::::::e::::::cv25519::
pub:f:255:22:BBBB111122223333:1710000000:::-:::scSC::::::ed25519:::0:
fpr:::::::::000000000000000000000000BBBB111122223333:
uid:f::::1710000000::H2::Bob Example <bob@example.com>::::::::::0:
LISTING
    exit 0
    ;;
  *--sign*)
    read -r pass
    if [[ "$pass" == "correct" ]]; then
      echo "signed"
      exit 0
    fi
    echo "gpg: signing failed: Bad passphrase" >&2
    exit 2
    ;;
  *--list-only*)
    content="$(cat "$last")"
    if [[ "$content" != *"BEGIN PGP MESSAGE"* || "$content" == *"garbage"* ]]; then
      status "NODATA 1"
      echo "gpg: no valid OpenPGP data found." >&2
      exit 2
    fi
    if [[ "$content" == *"to:alice"* ]]; then status "ENC_TO AAAA444455556666 18 0"; fi
    if [[ "$content" == *"to:nobody"* ]]; then status "ENC_TO FFFF000011112222 18 0"; fi
    exit 0
    ;;
  *--decrypt*)
    read -r pass
    content="$(cat "$last")"
    if [[ "$pass" != "correct" ]]; then
      status "DECRYPTION_FAILED"
      exit 2
    fi
    status "DECRYPTION_OKAY"
    if [[ "$content" == *"signed:bob"* ]]; then
      status "NEWSIG"
      status "GOODSIG BBBB111122223333 Bob Example <bob@example.com>"
    fi
    if [[ "$content" == *"signed:mallory"* ]]; then
      status "NEWSIG"
      status "ERRSIG 9999888877776666 22 10 01 1700000000 9 -"
    fi
    echo "Hello Alice"
    exit 0
    ;;
  *--verify*)
    content="$(cat "$last")"
    if [[ "$content" == *"bob-good"* ]]; then
      status "GOODSIG BBBB111122223333 Bob Example <bob@example.com>"
    elif [[ "$content" == *"bob-bad"* ]]; then
      status "BADSIG BBBB111122223333 Bob Example <bob@example.com>"
    fi
    exit 0
    ;;
esac

echo "fake gpg: unsupported arguments: $args" >&2
exit 2
"#;

/// Temp directory with a fake gpg and a config pointing at it.
pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();

        let gpg = dir.child("gpg");
        gpg.write_str(FAKE_GPG).unwrap();
        std::fs::set_permissions(gpg.path(), std::fs::Permissions::from_mode(0o755)).unwrap();

        dir.child("config.toml")
            .write_str(&format!(
                "[gpg]\nbinary = \"{}\"\n\n[account]\nemail = \"alice@example.com\"\n\n[prompt]\nmax_attempts = 1\n",
                gpg.path().display()
            ))
            .unwrap();

        Self { dir }
    }

    /// Fixture whose config points at a gpg that does not exist.
    pub fn without_gpg() -> Self {
        let dir = TempDir::new().unwrap();
        dir.child("config.toml")
            .write_str("[gpg]\nbinary = \"/nonexistent/gpg-binary\"\n")
            .unwrap();
        Self { dir }
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("config.toml")
    }

    /// mailpgp in the fixture directory, without a config argument.
    pub fn bare(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("mailpgp");
        cmd.current_dir(self.dir.path())
            .env_remove("MAILPGP_PASSPHRASE")
            .env_remove("RUST_LOG");
        cmd
    }

    /// mailpgp with the fixture config and no inherited passphrase.
    pub fn mailpgp(&self) -> Command {
        let mut cmd = self.bare();
        cmd.arg("--config").arg(self.config_path());
        cmd
    }

    /// Write an armored message file and return its name.
    pub fn message(&self, name: &str, markers: &str) -> String {
        self.dir
            .child(name)
            .write_str(&format!(
                "-----BEGIN PGP MESSAGE-----\n\n{markers}\n-----END PGP MESSAGE-----\n"
            ))
            .unwrap();
        name.to_string()
    }

    /// Write a cleartext-signed file and return its name.
    pub fn signed(&self, name: &str, body: &str, marker: &str) -> String {
        self.dir
            .child(name)
            .write_str(&format!(
                "-----BEGIN PGP SIGNED MESSAGE-----\nHash: SHA256\n\n{body}\n\
                 -----BEGIN PGP SIGNATURE-----\n\n{marker}\n-----END PGP SIGNATURE-----\n"
            ))
            .unwrap();
        name.to_string()
    }
}
