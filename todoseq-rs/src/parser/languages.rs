//! Comment syntax per source language, for tasks inside fenced code blocks.

/// Regex fragments describing one language's comment tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageComments {
    /// Canonical name, used as the grammar key.
    pub name: &'static str,
    /// Fence info strings that select this language.
    pub aliases: &'static [&'static str],
    pub single_line: Option<&'static str>,
    pub multi_line_start: Option<&'static str>,
    pub multi_line_end: Option<&'static str>,
    /// Leading token of continuation lines inside a block comment (` * `).
    pub multiline_mid: Option<&'static str>,
}

impl LanguageComments {
    /// Alternation of every token that may open a comment line, longest forms first.
    pub fn open_alternation(&self) -> Option<String> {
        let parts: Vec<&str> = [self.multi_line_start, self.single_line, self.multiline_mid]
            .into_iter()
            .flatten()
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("|"))
        }
    }
}

const C_STYLE: (Option<&str>, Option<&str>, Option<&str>, Option<&str>) =
    (Some(r"//+!?"), Some(r"/\*+!?"), Some(r"\*+/"), Some(r"\*+"));

const HASH: Option<&str> = Some("#+");

macro_rules! c_style {
    ($name:expr, $aliases:expr) => {
        LanguageComments {
            name: $name,
            aliases: $aliases,
            single_line: C_STYLE.0,
            multi_line_start: C_STYLE.1,
            multi_line_end: C_STYLE.2,
            multiline_mid: C_STYLE.3,
        }
    };
}

macro_rules! hash_style {
    ($name:expr, $aliases:expr) => {
        LanguageComments {
            name: $name,
            aliases: $aliases,
            single_line: HASH,
            multi_line_start: None,
            multi_line_end: None,
            multiline_mid: None,
        }
    };
}

pub static LANGUAGES: &[LanguageComments] = &[
    c_style!("rust", &["rust", "rs"]),
    c_style!("c", &["c", "h"]),
    c_style!("cpp", &["cpp", "c++", "cc", "cxx", "hpp"]),
    c_style!("csharp", &["csharp", "cs", "c#"]),
    c_style!("java", &["java"]),
    c_style!("javascript", &["javascript", "js", "jsx", "mjs", "cjs"]),
    c_style!("typescript", &["typescript", "ts", "tsx"]),
    c_style!("go", &["go", "golang"]),
    c_style!("swift", &["swift"]),
    c_style!("kotlin", &["kotlin", "kt", "kts"]),
    c_style!("scala", &["scala"]),
    c_style!("dart", &["dart"]),
    c_style!("php", &["php"]),
    c_style!("objc", &["objc", "objective-c", "objectivec"]),
    c_style!("zig", &["zig"]),
    LanguageComments {
        name: "css",
        aliases: &["css", "scss", "less"],
        single_line: None,
        multi_line_start: Some(r"/\*+"),
        multi_line_end: Some(r"\*+/"),
        multiline_mid: Some(r"\*+"),
    },
    LanguageComments {
        name: "python",
        aliases: &["python", "py", "python3"],
        single_line: HASH,
        multi_line_start: Some(r#""""|'''"#),
        multi_line_end: Some(r#""""|'''"#),
        multiline_mid: None,
    },
    LanguageComments {
        name: "ruby",
        aliases: &["ruby", "rb"],
        single_line: HASH,
        multi_line_start: Some("=begin"),
        multi_line_end: Some("=end"),
        multiline_mid: None,
    },
    hash_style!("shell", &["shell", "sh", "bash", "zsh", "fish", "console"]),
    hash_style!("yaml", &["yaml", "yml"]),
    hash_style!("toml", &["toml"]),
    hash_style!("perl", &["perl", "pl"]),
    hash_style!("r", &["r"]),
    hash_style!("dockerfile", &["dockerfile", "docker"]),
    hash_style!("makefile", &["makefile", "make", "mk"]),
    hash_style!("elixir", &["elixir", "ex", "exs"]),
    hash_style!("nix", &["nix"]),
    LanguageComments {
        name: "powershell",
        aliases: &["powershell", "ps1", "pwsh"],
        single_line: HASH,
        multi_line_start: Some("<#"),
        multi_line_end: Some("#>"),
        multiline_mid: None,
    },
    LanguageComments {
        name: "julia",
        aliases: &["julia", "jl"],
        single_line: HASH,
        multi_line_start: Some("#="),
        multi_line_end: Some("=#"),
        multiline_mid: None,
    },
    LanguageComments {
        name: "sql",
        aliases: &["sql", "psql", "mysql", "sqlite"],
        single_line: Some("--"),
        multi_line_start: Some(r"/\*+"),
        multi_line_end: Some(r"\*+/"),
        multiline_mid: Some(r"\*+"),
    },
    LanguageComments {
        name: "lua",
        aliases: &["lua"],
        single_line: Some("--"),
        multi_line_start: Some(r"--\[\["),
        multi_line_end: Some(r"\]\]"),
        multiline_mid: None,
    },
    LanguageComments {
        name: "haskell",
        aliases: &["haskell", "hs", "elm"],
        single_line: Some("--"),
        multi_line_start: Some(r"\{-"),
        multi_line_end: Some(r"-\}"),
        multiline_mid: None,
    },
    LanguageComments {
        name: "lisp",
        aliases: &["lisp", "elisp", "emacs-lisp", "clojure", "clj", "scheme", "racket"],
        single_line: Some(";+"),
        multi_line_start: None,
        multi_line_end: None,
        multiline_mid: None,
    },
    LanguageComments {
        name: "html",
        aliases: &["html", "xml", "svg", "vue", "svelte"],
        single_line: None,
        multi_line_start: Some("<!--"),
        multi_line_end: Some("-->"),
        multiline_mid: None,
    },
    LanguageComments {
        name: "latex",
        aliases: &["latex", "tex", "matlab", "erlang", "erl"],
        single_line: Some("%+"),
        multi_line_start: None,
        multi_line_end: None,
        multiline_mid: None,
    },
    LanguageComments {
        name: "ini",
        aliases: &["ini", "cfg", "conf"],
        single_line: Some("[;#]"),
        multi_line_start: None,
        multi_line_end: None,
        multiline_mid: None,
    },
    LanguageComments {
        name: "vim",
        aliases: &["vim", "vimscript"],
        single_line: Some("\""),
        multi_line_start: None,
        multi_line_end: None,
        multiline_mid: None,
    },
];

/// Find the comment syntax for a fence info string (case-insensitive).
pub fn lookup(language: &str) -> Option<&'static LanguageComments> {
    let language = language.trim().to_lowercase();
    if language.is_empty() {
        return None;
    }
    LANGUAGES
        .iter()
        .find(|lang| lang.aliases.iter().any(|alias| *alias == language))
}
