use std::path::PathBuf;

const HEREDOC_MARKER: &str = "ROOTCAMP_LAB_INSTRUCTIONS";

/// Everything the host needs to run a lab shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellRequest {
    /// Directory the shell starts in
    pub working_dir: PathBuf,
    pub sandbox_path: PathBuf,
    pub lesson_title: String,
    pub code: String,
    /// Instructions with every placeholder already filled in
    pub instructions: String,
    /// Interactive shell exec'd after the banner
    pub program: String,
}

impl ShellRequest {
    /// `PS1` shown inside the lab.
    pub fn prompt(&self) -> String {
        format!("rootcamp:{}$ ", self.code)
    }

    /// Script for `bash -c`: print the banner, enter the start directory, and
    /// replace itself with the interactive shell.
    pub fn script(&self) -> String {
        let rule = "═".repeat(78);
        let mut script = String::new();
        script.push_str("clear\n");
        script.push_str(&format!("printf '\\033[1;96m╔{rule}╗\\n'\n"));
        script.push_str(
            "printf '║\\033[0m\\033[1;92m                          ROOT CAMP - LAB SESSION                             \\033[1;96m║\\n'\n",
        );
        script.push_str(&format!("printf '╚{rule}╝\\033[0m\\n\\n'\n"));
        script.push_str(&format!(
            "printf '\\033[1;33mLesson:\\033[0m \\033[1;97m%s\\033[0m\\n\\n' {}\n",
            shell_quote(&self.lesson_title)
        ));
        let instructions = self.instructions.trim_end();
        let marker = heredoc_marker(instructions);
        script.push_str(&format!("cat << '{marker}'\n{instructions}\n{marker}\n"));
        script.push_str("printf '\\n\\033[1;36mYour sandbox is located at:\\033[0m\\n'\n");
        script.push_str(&format!(
            "printf '  \\033[36m%s\\033[0m\\n\\n' {}\n",
            shell_quote(&self.sandbox_path.to_string_lossy())
        ));
        script.push_str(
            "printf '\\033[35mWhen you'\"'\"'re done, type \\033[1;91mexit\\033[0m\\033[35m to return to Root Camp and enter your answer.\\033[0m\\n\\n'\n",
        );
        script.push_str("printf '\\033[1;32mGood luck!\\033[0m\\n\\n'\n");
        script.push_str(&format!(
            "cd {} || exit 1\n",
            shell_quote(&self.working_dir.to_string_lossy())
        ));
        script.push_str(&format!("exec {}\n", shell_quote(&self.program)));
        script
    }
}

/// A heredoc delimiter that does not occur as a line of `body`.
fn heredoc_marker(body: &str) -> String {
    let mut marker = HEREDOC_MARKER.to_string();
    while body.lines().any(|line| line == marker) {
        marker.push('_');
    }
    marker
}

/// Single-quote `value` for POSIX shells.
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r#"'"'"'"#))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn request() -> ShellRequest {
        ShellRequest {
            working_dir: PathBuf::from("/tmp/rootcamp-abc/start"),
            sandbox_path: PathBuf::from("/tmp/rootcamp-abc"),
            lesson_title: "Bob's lesson".to_string(),
            code: "LS".to_string(),
            instructions: "List the files.\n".to_string(),
            program: "/bin/zsh".to_string(),
        }
    }

    #[test]
    fn prompt_carries_lesson_code() {
        assert_eq!(request().prompt(), "rootcamp:LS$ ");
    }

    #[test]
    fn quotes_embedded_single_quotes() {
        assert_eq!(shell_quote("it's"), r#"'it'"'"'s'"#);
    }

    #[test]
    fn script_enters_start_dir_and_execs_shell() {
        let script = request().script();
        assert!(script.contains("cd '/tmp/rootcamp-abc/start' || exit 1\n"));
        assert!(script.ends_with("exec '/bin/zsh'\n"));
        assert!(script.contains("List the files.\nROOTCAMP_LAB_INSTRUCTIONS\n"));
        assert!(script.contains(r#"'Bob'"'"'s lesson'"#));
    }

    #[test]
    fn heredoc_marker_avoids_instruction_lines() {
        assert_eq!(heredoc_marker("plain text"), HEREDOC_MARKER);
        assert_eq!(
            heredoc_marker("before\nROOTCAMP_LAB_INSTRUCTIONS\nafter"),
            "ROOTCAMP_LAB_INSTRUCTIONS_"
        );
    }
}
