//! Framework registry: detection triggers and selection presets, as data

use once_cell::sync::Lazy;
use regex::Regex;

/// Something whose presence in the project root identifies a framework
#[derive(Debug, Clone)]
pub enum Trigger {
    /// Literal entry name, compared case-insensitively. A name containing
    /// `/` refers to a nested path under the root.
    Name(&'static str),
    /// Pattern tested against each root entry name
    Pattern(Regex),
}

impl Trigger {
    /// Whether this trigger matches one immediate entry name
    pub fn matches_entry(&self, entry_name: &str) -> bool {
        match self {
            Self::Name(name) => !name.contains('/') && name.eq_ignore_ascii_case(entry_name),
            Self::Pattern(re) => re.is_match(entry_name),
        }
    }

    /// Nested literal path, if this trigger is one
    pub fn nested_path(&self) -> Option<&'static str> {
        match self {
            Self::Name(name) if name.contains('/') => Some(name),
            _ => None,
        }
    }
}

/// Default selection for a framework
#[derive(Debug, Clone)]
pub struct PresetRule {
    /// Directory names (or root-relative directory paths) whose whole subtree is selected
    pub include_dirs: Vec<&'static str>,
    /// Files outside forced directories are selected when their path matches one of these
    pub include_files: Vec<Regex>,
    /// Paths matching one of these are deselected together with their subtree
    pub exclude: Vec<Regex>,
}

/// A catalog entry
#[derive(Debug, Clone)]
pub struct FrameworkDefinition {
    /// Stable identifier (`next`, `rust`, ...)
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// Higher is evaluated first
    pub priority: i32,
    /// Any matching trigger selects this framework
    pub triggers: Vec<Trigger>,
    /// Preset applied once detected
    pub preset: PresetRule,
}

fn name(value: &'static str) -> Trigger {
    Trigger::Name(value)
}

fn pattern(value: &str) -> Trigger {
    Trigger::Pattern(compile(value))
}

fn compile(value: &str) -> Regex {
    Regex::new(value).expect("catalog pattern is valid")
}

fn rule(include_dirs: &[&'static str], include_files: &[&str], exclude: &[&str]) -> PresetRule {
    PresetRule {
        include_dirs: include_dirs.to_vec(),
        include_files: include_files.iter().map(|p| compile(p)).collect(),
        exclude: exclude.iter().map(|p| compile(p)).collect(),
    }
}

fn entry(
    id: &'static str,
    display: &'static str,
    priority: i32,
    triggers: Vec<Trigger>,
    preset: PresetRule,
) -> FrameworkDefinition {
    FrameworkDefinition {
        id,
        name: display,
        priority,
        triggers,
        preset,
    }
}

/// All known frameworks, in catalog order
pub static FRAMEWORKS: Lazy<Vec<FrameworkDefinition>> = Lazy::new(|| {
    vec![
        entry(
            "next",
            "Next.js",
            100,
            vec![name("next.config.js"), name("next.config.ts"), name("next.config.mjs")],
            rule(
                &["app", "pages", "components", "lib", "public", "styles", "utils", "hooks", "actions"],
                &[r"next\.config", r"package\.json", r"tsconfig", r"\.env", r"middleware"],
                &[r"\.next", r"node_modules", r"out", r"coverage"],
            ),
        ),
        entry(
            "nuxt",
            "Nuxt.js",
            100,
            vec![name("nuxt.config.js"), name("nuxt.config.ts")],
            rule(
                &["pages", "components", "layouts", "server", "composables", "plugins", "assets", "middleware"],
                &[r"nuxt\.config", r"package\.json", r"tsconfig", r"app\.vue"],
                &[r"\.nuxt", r"\.output", r"node_modules", r"dist"],
            ),
        ),
        entry(
            "sveltekit",
            "SvelteKit",
            95,
            vec![name("svelte.config.js")],
            rule(
                &["src", "static"],
                &[r"svelte\.config", r"vite\.config", r"package\.json", r"tsconfig"],
                &[r"\.svelte-kit", r"node_modules", r"build"],
            ),
        ),
        entry(
            "astro",
            "Astro",
            95,
            vec![name("astro.config.mjs"), name("astro.config.ts")],
            rule(
                &["src", "public"],
                &[r"astro\.config", r"package\.json", r"tsconfig"],
                &[r"\.astro", r"dist", r"node_modules"],
            ),
        ),
        entry(
            "remix",
            "Remix",
            95,
            vec![name("remix.config.js")],
            rule(
                &["app", "public"],
                &[r"remix\.config", r"vite\.config", r"package\.json"],
                &[r"build", r"\.cache", r"node_modules"],
            ),
        ),
        entry(
            "angular",
            "Angular",
            90,
            vec![name("angular.json")],
            rule(
                &["src"],
                &[r"angular\.json", r"package\.json", r"tsconfig"],
                &[r"\.angular", r"node_modules", r"dist"],
            ),
        ),
        entry(
            "nest",
            "NestJS",
            90,
            vec![name("nest-cli.json"), pattern(r"\.nest-cli")],
            rule(
                &["src", "test"],
                &[r"nest-cli", r"package\.json", r"tsconfig", r"\.env"],
                &[r"dist", r"node_modules"],
            ),
        ),
        entry(
            "vite",
            "Vite (React/Vue)",
            80,
            vec![name("vite.config.js"), name("vite.config.ts")],
            rule(
                &["src", "public", "assets", "lib"],
                &[r"vite\.config", r"index\.html", r"package\.json", r"tsconfig"],
                &[r"dist", r"node_modules"],
            ),
        ),
        entry(
            "node",
            "Node.js Project",
            10,
            vec![name("package.json")],
            rule(
                &["src", "lib", "config", "routes", "controllers", "models", "utils"],
                &[r"package\.json", r"\.env", r"index\.(js|ts)", r"server\.(js|ts)"],
                &[r"node_modules", r"dist", r"build", r"coverage"],
            ),
        ),
        entry(
            "flutter",
            "Flutter",
            90,
            vec![name("pubspec.yaml")],
            rule(
                &["lib", "test", "assets"],
                &[r"pubspec\.yaml", r"analysis_options\.yaml"],
                &[r"\.dart_tool", r"build", r"ios", r"android", r"web", r"linux", r"windows", r"macos"],
            ),
        ),
        entry(
            "expo",
            "Expo",
            90,
            vec![name("app.json")],
            rule(
                &["app", "components", "assets", "hooks", "constants"],
                &[r"app\.json", r"package\.json", r"tsconfig", r"babel\.config"],
                &[r"\.expo", r"node_modules", r"web-build"],
            ),
        ),
        entry(
            "reactnative",
            "React Native (CLI)",
            85,
            vec![pattern(r"metro\.config")],
            rule(
                &["src", "app", "components"],
                &[r"metro\.config", r"package\.json", r"index\.js"],
                &[r"node_modules", r"ios", r"android"],
            ),
        ),
        entry(
            "tauri",
            "Tauri (Rust)",
            95,
            vec![name("src-tauri")],
            rule(
                &["src", "src-tauri"],
                &[r"package\.json", r"Cargo\.toml"],
                &[r"target", r"node_modules", r"dist"],
            ),
        ),
        entry(
            "electron",
            "Electron",
            85,
            vec![pattern(r"electron-builder"), pattern(r"forge\.config")],
            rule(
                &["src", "app", "resources"],
                &[r"main\.js", r"preload\.js", r"package\.json"],
                &[r"dist", r"out", r"node_modules"],
            ),
        ),
        entry(
            "django",
            "Django",
            90,
            vec![name("manage.py")],
            rule(
                &[],
                &[r"manage\.py", r"requirements\.txt", r"pyproject\.toml", r"\.env"],
                &[r"__pycache__", r"\.venv", r"venv", r"env", r"\.git", r"staticfiles"],
            ),
        ),
        entry(
            "fastapi",
            "FastAPI / Flask",
            50,
            vec![name("requirements.txt"), name("pyproject.toml"), name("main.py"), name("app.py")],
            rule(
                &["app", "src", "routers", "models", "api"],
                &[r"\.py$", r"requirements\.txt", r"\.env"],
                &[r"__pycache__", r"\.venv", r"venv", r"\.pytest_cache"],
            ),
        ),
        entry(
            "streamlit",
            "Streamlit",
            60,
            vec![pattern(r"\.streamlit"), name("streamlit_app.py")],
            rule(
                &["pages", ".streamlit"],
                &[r"\.py$", r"requirements\.txt"],
                &[r"__pycache__", r"\.venv"],
            ),
        ),
        entry(
            "laravel",
            "Laravel",
            90,
            vec![name("artisan")],
            rule(
                &["app", "routes", "config", "database", "resources", "tests"],
                &[r"composer\.json", r"\.env", r"artisan"],
                &[r"vendor", r"storage", r"bootstrap/cache", r"public"],
            ),
        ),
        entry(
            "symfony",
            "Symfony",
            90,
            vec![name("symfony.lock"), name("bin/console")],
            rule(
                &["src", "config", "templates", "migrations"],
                &[r"composer\.json", r"\.env"],
                &[r"vendor", r"var", r"public/build"],
            ),
        ),
        entry(
            "wordpress",
            "WordPress",
            80,
            vec![name("wp-config.php"), name("wp-content")],
            rule(
                &["wp-content/themes", "wp-content/plugins"],
                &[r"wp-config\.php", r"\.htaccess"],
                &[r"wp-admin", r"wp-includes", r"node_modules"],
            ),
        ),
        entry(
            "springboot",
            "Spring Boot",
            95,
            vec![pattern(r"mvnw"), pattern(r"gradlew")],
            rule(
                &["src/main/java", "src/main/resources"],
                &[r"pom\.xml", r"build\.gradle", r"\.properties$", r"\.yaml$"],
                &[r"target", r"build", r"\.mvn", r"\.gradle", r"test"],
            ),
        ),
        entry(
            "android_native",
            "Android (Native)",
            90,
            vec![name("app/src/main/AndroidManifest.xml")],
            rule(
                &["app/src/main/java", "app/src/main/res"],
                &[r"build\.gradle", r"gradle\.properties"],
                &[r"\.gradle", r"build", r"captures"],
            ),
        ),
        entry(
            "unity",
            "Unity",
            90,
            vec![name("Assets"), name("ProjectSettings")],
            rule(
                &["Assets", "Packages", "ProjectSettings"],
                &[r"\.cs$", r"\.shader$"],
                &[r"Library", r"Temp", r"Logs", r"Builds", r"\.sln$", r"\.csproj$"],
            ),
        ),
        entry(
            "dotnet",
            ".NET / ASP.NET Core",
            80,
            vec![pattern(r"\.csproj$"), pattern(r"\.sln$")],
            rule(
                &["Controllers", "Models", "Views", "Services", "Data", "Properties"],
                &[r"Program\.cs", r"Startup\.cs", r"appsettings\.json", r"\.csproj$"],
                &[r"bin", r"obj", r"\.vs", r"wwwroot/lib"],
            ),
        ),
        entry(
            "rails",
            "Ruby on Rails",
            90,
            vec![name("Gemfile"), name("Rakefile"), name("app/controllers")],
            rule(
                &["app", "config", "db", "lib", "routes"],
                &[r"Gemfile", r"config\.ru"],
                &[r"tmp", r"log", r"vendor", r"public/assets"],
            ),
        ),
        entry(
            "phoenix",
            "Phoenix (Elixir)",
            90,
            vec![name("mix.exs"), name("lib/phoenix")],
            rule(
                &["lib", "priv", "test", "config"],
                &[r"mix\.exs", r"\.formatter\.exs"],
                &[r"_build", r"deps", r"assets/node_modules"],
            ),
        ),
        entry(
            "go",
            "Go",
            80,
            vec![name("go.mod")],
            rule(
                &["cmd", "internal", "pkg", "api", "web"],
                &[r"\.go$", r"go\.mod", r"go\.sum"],
                &[r"vendor", r"bin"],
            ),
        ),
        entry(
            "rust",
            "Rust",
            80,
            vec![name("Cargo.toml")],
            rule(
                &["src", "tests", "benches", "examples"],
                &[r"Cargo\.toml", r"Cargo\.lock"],
                &[r"target"],
            ),
        ),
    ]
});

/// Catalog entries sorted by descending priority, ties in catalog order
pub fn by_priority() -> Vec<&'static FrameworkDefinition> {
    let mut sorted: Vec<_> = FRAMEWORKS.iter().collect();
    sorted.sort_by(|a, b| b.priority.cmp(&a.priority));
    sorted
}

/// Look up a framework by id
pub fn find(id: &str) -> Option<&'static FrameworkDefinition> {
    FRAMEWORKS.iter().find(|def| def.id.eq_ignore_ascii_case(id))
}
