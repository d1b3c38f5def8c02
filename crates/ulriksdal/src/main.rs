#![forbid(unsafe_code)]

//! Ulriksdal CLI: encrypt and decrypt XML Encryption documents.

use clap::{Parser, Subcommand};
use log::debug;
use std::path::{Path, PathBuf};
use std::process;
use ulriksdal_core::{ns, Error};
use ulriksdal_enc::{DecryptionOptions, EncryptionOptions, InputEncoding};

#[derive(Parser)]
#[command(
    name = "ulriksdal",
    about = "Ulriksdal: XML Encryption (XMLENC) for SAML and other identity protocols",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a file into an EncryptedData document
    Encrypt {
        /// File holding the content to encrypt
        file: PathBuf,

        /// Recipient RSA public key (PEM, SPKI or PKCS#1)
        #[arg(long, required_unless_present = "cert_key", conflicts_with = "cert_key")]
        pubkey: Option<PathBuf>,

        /// Encrypt to the public key of the --cert certificate
        #[arg(long = "cert-key")]
        cert_key: bool,

        /// Sender certificate (PEM), embedded in the output
        #[arg(long)]
        cert: PathBuf,

        /// Content encryption algorithm (URI or short name, default aes256-cbc)
        #[arg(long)]
        alg: Option<String>,

        /// Key transport algorithm (URI or short name)
        #[arg(long = "key-transport")]
        key_transport: String,

        /// How the file content is read: utf8, latin1, base64, hex
        #[arg(long, default_value = "utf8")]
        encoding: InputEncoding,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Decrypt an EncryptedData document
    Decrypt {
        /// Input encrypted XML file
        file: PathBuf,

        /// Recipient RSA private key (PEM, PKCS#8 or PKCS#1)
        #[arg(short = 'k', long)]
        key: PathBuf,

        /// Leave block padding in the output
        #[arg(long = "no-auto-padding")]
        no_auto_padding: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// List supported algorithms
    Info,
}

fn main() {
    let cli = Cli::parse();

    let verbose = match &cli.command {
        Commands::Encrypt { verbose, .. } | Commands::Decrypt { verbose, .. } => *verbose,
        Commands::Info => false,
    };
    init_logging(verbose);

    let result = match cli.command {
        Commands::Encrypt {
            file,
            pubkey,
            cert_key: _,
            cert,
            alg,
            key_transport,
            encoding,
            output,
            verbose: _,
        } => cmd_encrypt(&file, pubkey, &cert, alg, &key_transport, encoding, output),
        Commands::Decrypt {
            file,
            key,
            no_auto_padding,
            output,
            verbose: _,
        } => cmd_decrypt(&file, &key, no_auto_padding, output),
        Commands::Info => cmd_info(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(default));
}

fn cmd_encrypt(
    file: &Path,
    pubkey: Option<PathBuf>,
    cert: &Path,
    alg: Option<String>,
    key_transport: &str,
    encoding: InputEncoding,
    output: Option<PathBuf>,
) -> Result<(), Error> {
    let content = read_file(file)?;
    let cert_pem = read_file(cert)?;

    let options = match pubkey {
        Some(path) => EncryptionOptions::from_pem(&read_file(&path)?, &cert_pem)?,
        None => EncryptionOptions::from_certificate_pem(&cert_pem)?,
    };
    let mut options = options
        .with_key_transport_algorithm(expand_algorithm(key_transport))
        .with_input_encoding(encoding);
    if let Some(alg) = alg {
        options = options.with_content_algorithm(expand_algorithm(&alg));
    }

    debug!("encrypting {}", file.display());
    let encrypted = ulriksdal_enc::encrypt(&content, &options)?;
    write_output(output, encrypted.as_bytes())
}

fn cmd_decrypt(
    file: &Path,
    key: &Path,
    no_auto_padding: bool,
    output: Option<PathBuf>,
) -> Result<(), Error> {
    let xml = read_file(file)?;
    let mut options = DecryptionOptions::from_pem(&read_file(key)?)?;
    if no_auto_padding {
        options = options.with_auto_padding(false);
    }

    debug!("decrypting {}", file.display());
    let decrypted = ulriksdal_enc::decrypt_to_bytes(&xml, &options)?;
    write_output(output, &decrypted)
}

fn cmd_info() -> Result<(), Error> {
    println!("Ulriksdal: XML Encryption for identity protocols");
    println!();
    println!("Content encryption algorithms:");
    println!("  aes128-cbc, aes256-cbc (default), tripledes-cbc");
    println!();
    println!("Key transport algorithms:");
    println!("  rsa-oaep-mgf1p (MGF1 with SHA-1), rsa-1_5");
    println!();
    println!("Key formats:");
    println!("  PEM: PKCS#8, PKCS#1, SPKI, X.509 certificate");
    Ok(())
}

// ── Utility functions ────────────────────────────────────────────────

/// Accept either a full algorithm URI or the fragment after `xmlenc#`.
fn expand_algorithm(name: &str) -> String {
    if name.contains(':') {
        name.to_owned()
    } else {
        format!("{}{name}", ns::ENC)
    }
}

fn read_file(path: &Path) -> Result<String, Error> {
    std::fs::read_to_string(path).map_err(|e| {
        Error::Io(std::io::Error::new(e.kind(), format!("{}: {e}", path.display())))
    })
}

fn write_output(path: Option<PathBuf>, data: &[u8]) -> Result<(), Error> {
    match path {
        Some(p) => std::fs::write(&p, data).map_err(|e| {
            Error::Io(std::io::Error::new(e.kind(), format!("{}: {e}", p.display())))
        }),
        None => {
            use std::io::Write;
            std::io::stdout().write_all(data)?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use ulriksdal_core::algorithm;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_expand_algorithm() {
        assert_eq!(expand_algorithm("aes128-cbc"), algorithm::AES128_CBC);
        assert_eq!(expand_algorithm("rsa-1_5"), algorithm::RSA_PKCS1);
        assert_eq!(expand_algorithm(algorithm::RSA_OAEP), algorithm::RSA_OAEP);
    }

    #[test]
    fn test_parse_encrypt_args() {
        let cli = Cli::try_parse_from([
            "ulriksdal", "encrypt", "in.xml", "--cert-key", "--cert", "cert.pem",
            "--key-transport", "rsa-oaep-mgf1p", "--encoding", "hex",
        ])
        .unwrap();
        match cli.command {
            Commands::Encrypt { pubkey, cert_key, encoding, alg, .. } => {
                assert!(pubkey.is_none());
                assert!(cert_key);
                assert_eq!(encoding, InputEncoding::Hex);
                assert!(alg.is_none());
            }
            _ => panic!("expected encrypt"),
        }
    }

    #[test]
    fn test_encrypt_needs_a_recipient_key() {
        let res = Cli::try_parse_from([
            "ulriksdal", "encrypt", "in.xml", "--cert", "cert.pem", "--key-transport", "rsa-1_5",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn test_parse_decrypt_args() {
        let cli = Cli::try_parse_from([
            "ulriksdal", "decrypt", "doc.xml", "-k", "key.pem", "--no-auto-padding", "-v",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Decrypt { no_auto_padding: true, verbose: true, .. }
        ));
    }
}
