use std::borrow::Cow;
use std::path::Path;

use regex::{NoExpand, Regex};

/// Rewrites `import "<root>/..."` statements so they resolve against the
/// assembled workspace root instead of the source repository root.
#[derive(Debug)]
pub struct ImportRewriter {
    pattern: Regex,
    replacement: String,
}

impl ImportRewriter {
    /// Builds the rule `import "<root>/` -> `import "<repo>/<root>/`.
    ///
    /// The root segment is escaped before compilation, so the pattern always
    /// compiles; a failure here is a bug in the pattern template itself.
    pub fn new(root_segment: &str, repo_name: &str) -> Self {
        let pattern = Regex::new(&format!(r#"import\s*"{}/"#, regex::escape(root_segment)))
            .expect("import rewrite pattern must compile");
        let replacement = format!(r#"import "{}/{}/"#, repo_name, root_segment);
        ImportRewriter {
            pattern,
            replacement,
        }
    }

    /// Applies the rule to a whole file. The pattern is anchored to the
    /// import keyword and its opening quote, so other occurrences of the root
    /// segment stay untouched. Applying the same rule twice prefixes twice;
    /// every file is rewritten exactly once, at fetch time.
    pub fn rewrite<'a>(&self, content: &'a str) -> Cow<'a, str> {
        self.pattern
            .replace_all(content, NoExpand(&self.replacement))
    }
}

/// First path component of a file's repository-root-relative location, the
/// directory its internal imports are expressed against.
///
/// Files sitting directly at the repository root have no such directory, so
/// there is nothing to rewrite for them.
pub fn root_segment(relative_path: &Path) -> Option<&str> {
    let mut components = relative_path.components();
    let first = components.next()?.as_os_str().to_str()?;
    components.next()?;
    Some(first)
}
