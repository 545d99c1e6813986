use anyhow::{Result, bail};
use std::io::{self, IsTerminal};
use zeroize::Zeroizing;

/// Environment variable consulted before stdin or the terminal.
pub const PASSWORD_ENV: &str = "SEALSTR_PASSWORD";

/// How the terminal prompt behaves. Env and piped stdin are read as-is.
pub enum PasswordPrompt {
    /// Existing password: asked once.
    Existing,
    /// New password for encryption: asked twice on a terminal.
    New,
}

pub fn read_password(prompt: PasswordPrompt) -> Result<Zeroizing<String>> {
    //  SEALSTR_PASSWORD="supersecret" sealstr decrypt ...
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        let pw = Zeroizing::new(pw);
        if !pw.is_empty() {
            return Ok(pw);
        }
    }

    //  echo "supersecret" | sealstr decrypt ...
    if !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_line(&mut buf)?;
        trim_newline(&mut buf);

        if buf.is_empty() {
            bail!("password cannot be empty");
        }
        return Ok(buf);
    }

    let pw = Zeroizing::new(rpassword::prompt_password("Password: ")?);
    if pw.is_empty() {
        bail!("password cannot be empty");
    }

    if let PasswordPrompt::New = prompt {
        let confirm = Zeroizing::new(rpassword::prompt_password("Confirm password: ")?);
        if *pw != *confirm {
            bail!("passwords do not match");
        }
    }

    Ok(pw)
}

fn trim_newline(s: &mut String) {
    while s.ends_with('\n') || s.ends_with('\r') {
        s.pop();
    }
}
