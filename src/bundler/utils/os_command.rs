//! Shell fragments for the shell that runs the bundling command.
//!
//! Container bundling always runs `bash`; local bundling runs the host's shell,
//! which is `cmd` on Windows.

/// Shell flavour the command is rendered for.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OsPlatform {
    Unix,
    Windows,
}

impl OsPlatform {
    /// Platform of the machine running this process.
    pub fn host() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Unix
        }
    }

    /// Joins path segments with this platform's separator.
    ///
    /// Segments are expected to use `/`; they are converted on Windows.
    pub fn join(&self, base: &str, relative: &str) -> String {
        match self {
            Self::Unix => {
                let base = base.trim_end_matches('/');
                format!("{base}/{relative}")
            }
            Self::Windows => {
                let base = base.trim_end_matches(['\\', '/']);
                format!("{}\\{}", base, relative.replace('/', "\\"))
            }
        }
    }

    /// Program and leading arguments that run a command string.
    pub fn shell(&self) -> [&'static str; 2] {
        match self {
            Self::Unix => ["bash", "-c"],
            Self::Windows => ["cmd", "/c"],
        }
    }

    /// Writes `content` to `path`.
    pub fn write(&self, path: &str, content: &str) -> String {
        match self {
            Self::Unix => format!("echo '{content}' > \"{path}\""),
            Self::Windows if content.is_empty() => format!("type nul > \"{path}\""),
            Self::Windows => format!("echo ^{content}^ > \"{path}\""),
        }
    }

    /// Copies a file.
    pub fn copy(&self, from: &str, to: &str) -> String {
        match self {
            Self::Unix => format!("cp \"{from}\" \"{to}\""),
            Self::Windows => format!("copy \"{from}\" \"{to}\""),
        }
    }

    /// Removes a file, ignoring a missing one.
    pub fn remove(&self, path: &str) -> String {
        match self {
            Self::Unix => format!("rm -f \"{path}\""),
            Self::Windows => format!("del /f /q \"{path}\""),
        }
    }

    /// Runs `commands` inside `dir` without changing the directory for what
    /// follows in the chain.
    pub fn in_directory(&self, dir: &str, commands: &[String]) -> String {
        let body = chain(commands);
        match self {
            Self::Unix => format!("(cd \"{dir}\" && {body})"),
            Self::Windows => format!("pushd \"{dir}\" && {body} && popd"),
        }
    }
}

/// Joins command fragments with `&&`, skipping empty ones.
pub fn chain<S: AsRef<str>>(commands: &[S]) -> String {
    commands
        .iter()
        .map(|c| c.as_ref().trim())
        .filter(|c| !c.is_empty())
        .collect::<Vec<_>>()
        .join(" && ")
}

