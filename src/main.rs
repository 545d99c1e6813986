use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
mod auth;
use auth::PasswordPrompt;
use sealstr::{
    AeadAlgorithm, EncryptedRecord, Encoding, KdfAlgorithm, ParameterSet, Storage, format,
    generate_password,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, clap::Args)]
struct ParamArgs {
    /// Key derivation function: pbkdf2-hmac-sha256 (default) or argon2id
    #[arg(long, env = "SEALSTR_KDF")]
    kdf: Option<KdfAlgorithm>,

    /// PBKDF2 iterations or Argon2 time cost (default: 65536 / 3)
    #[arg(long, env = "SEALSTR_ITERATIONS")]
    iterations: Option<u32>,

    /// Salt length in bytes (default: 32)
    #[arg(long = "salt-len", env = "SEALSTR_SALT_LEN")]
    salt_len: Option<u16>,

    /// Key length in bits (default: 256)
    #[arg(long = "key-bits", env = "SEALSTR_KEY_BITS")]
    key_bits: Option<u16>,

    /// Cipher: aes-gcm (default) or xchacha20-poly1305
    #[arg(long, env = "SEALSTR_AEAD")]
    aead: Option<AeadAlgorithm>,

    /// Nonce length in bytes (default: native for the cipher)
    #[arg(long = "nonce-len", env = "SEALSTR_NONCE_LEN")]
    nonce_len: Option<u8>,

    /// Authentication tag length in bits (default: 128)
    #[arg(long = "tag-bits", env = "SEALSTR_TAG_BITS")]
    tag_bits: Option<u16>,

    /// Argon2 memory cost in KiB (default: 65536)
    #[arg(long = "memory-kib", env = "SEALSTR_MEMORY_KIB")]
    memory_kib: Option<u32>,

    /// Argon2 parallelism (default: 1)
    #[arg(long, env = "SEALSTR_PARALLELISM")]
    parallelism: Option<u32>,
}

impl ParamArgs {
    fn to_parameter_set(&self) -> ParameterSet {
        let mut params = match self.kdf {
            Some(KdfAlgorithm::Argon2id) => ParameterSet::argon2id(),
            _ => ParameterSet::default(),
        };

        if let Some(aead) = self.aead {
            params = params.with_aead(aead);
        }
        if let Some(iterations) = self.iterations {
            params = params.with_iterations(iterations);
        }
        if let Some(salt_len) = self.salt_len {
            params = params.with_salt_len(salt_len);
        }
        if let Some(key_bits) = self.key_bits {
            params = params.with_key_bits(key_bits);
        }
        if let Some(nonce_len) = self.nonce_len {
            params = params.with_nonce_len(nonce_len);
        }
        if let Some(tag_bits) = self.tag_bits {
            params = params.with_tag_bits(tag_bits);
        }
        if let Some(memory_kib) = self.memory_kib {
            params = params.with_memory_kib(memory_kib);
        }
        if let Some(parallelism) = self.parallelism {
            params = params.with_parallelism(parallelism);
        }

        params
    }
}

#[derive(Debug, clap::Args)]
struct RecordArgs {
    /// Record text (base64 or JSON)
    record: Option<String>,

    /// Read the record from a file instead
    #[arg(long = "in", value_name = "PATH", conflicts_with = "record")]
    input: Option<PathBuf>,
}

impl RecordArgs {
    fn load(&self) -> Result<EncryptedRecord> {
        match (&self.input, &self.record) {
            (Some(path), _) => Storage::new(path)
                .load_record()
                .with_context(|| format!("failed to read record from {}", path.display())),
            (None, Some(text)) => format::decode_text(text).context("failed to parse record"),
            (None, None) => bail!("no record given; pass it as an argument or with --in"),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "sealstr")]
#[command(
    version,
    about = "Encrypt and decrypt strings with a password (PBKDF2 + AES-GCM)."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Encrypts a text and prints the sealed record
    #[command(arg_required_else_help = true)]
    Encrypt {
        plaintext: String,

        /// Emit a JSON document instead of base64
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Write the record to a file
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,

        #[command(flatten)]
        params: ParamArgs,
    },

    /// Decrypts a record and prints the text
    Decrypt {
        #[command(flatten)]
        record: RecordArgs,
    },

    /// Shows the parameters stored in a record
    Inspect {
        #[command(flatten)]
        record: RecordArgs,
    },

    /// Prints a random base64 password
    Genpass {
        /// Number of random bytes
        #[arg(long, default_value_t = 32)]
        bytes: usize,
    },
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("SEALSTR_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let args = Cli::parse();

    match args.command {
        Commands::Encrypt {
            plaintext,
            json,
            out,
            params,
        } => {
            let params = params.to_parameter_set();
            let password = auth::read_password(PasswordPrompt::New)?;
            let record = EncryptedRecord::encrypt(&plaintext, &password, &params)
                .context("encryption failed")?;
            drop(password);

            let encoding = if json { Encoding::Json } else { Encoding::Base64 };
            match out {
                Some(path) => {
                    Storage::new(&path).save_record(&record, encoding)?;
                    println!("record written to {}", path.display());
                }
                None => println!("{}", format::encode_text(&record, encoding)?),
            }
        }
        Commands::Decrypt { record } => {
            let record = record.load()?;
            let password = auth::read_password(PasswordPrompt::Existing)?;
            let plaintext = record.decrypt(&password).context("decryption failed")?;
            println!("{}", plaintext.as_str());
        }
        Commands::Inspect { record } => {
            let record = record.load()?;
            println!("format:     v{}", format::CURRENT_VERSION);
            println!("{}", record.params());
            println!("ciphertext: {} bytes (tag included)", record.ciphertext().len());
        }
        Commands::Genpass { bytes } => {
            let password = generate_password(bytes)?;
            println!("{}", password.as_str());
        }
    }

    Ok(())
}
