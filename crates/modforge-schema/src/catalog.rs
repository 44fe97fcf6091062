//! Static table of dependency capabilities.
//!
//! A capability names a bundle of libraries that are always declared
//! together. Each item refers to a library by its version-manifest key so
//! that versions live in exactly one place.

use crate::dependency::Scope;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct CatalogItem {
    pub group: &'static str,
    pub artifact: &'static str,
    /// Key into the version manifest.
    pub library: &'static str,
    /// Items pinned to a configuration ignore the requested scope.
    pub fixed_scope: Option<Scope>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Capability {
    pub name: &'static str,
    pub description: &'static str,
    pub default_scope: Scope,
    pub items: &'static [CatalogItem],
}

const fn item(group: &'static str, artifact: &'static str, library: &'static str) -> CatalogItem {
    CatalogItem {
        group,
        artifact,
        library,
        fixed_scope: None,
    }
}

const fn pinned(
    group: &'static str,
    artifact: &'static str,
    library: &'static str,
    scope: Scope,
) -> CatalogItem {
    CatalogItem {
        group,
        artifact,
        library,
        fixed_scope: Some(scope),
    }
}

pub const CAPABILITIES: &[Capability] = &[
    Capability {
        name: "kotlin",
        description: "Kotlin standard library",
        default_scope: Scope::Implementation,
        items: &[item("org.jetbrains.kotlin", "kotlin-stdlib-jdk7", "kotlin")],
    },
    Capability {
        name: "kotlinCoroutines",
        description: "kotlinx.coroutines core",
        default_scope: Scope::Implementation,
        items: &[item(
            "org.jetbrains.kotlinx",
            "kotlinx-coroutines-core",
            "kotlinCoroutines",
        )],
    },
    Capability {
        name: "kotlinCoroutinesAndroid",
        description: "kotlinx.coroutines Android dispatcher",
        default_scope: Scope::Implementation,
        items: &[item(
            "org.jetbrains.kotlinx",
            "kotlinx-coroutines-android",
            "kotlinCoroutines",
        )],
    },
    Capability {
        name: "kotlinCoroutinesTest",
        description: "kotlinx.coroutines test utilities",
        default_scope: Scope::TestImplementation,
        items: &[item(
            "org.jetbrains.kotlinx",
            "kotlinx-coroutines-test",
            "kotlinCoroutines",
        )],
    },
    Capability {
        name: "inject",
        description: "javax.inject annotations",
        default_scope: Scope::Implementation,
        items: &[item("javax.inject", "javax.inject", "javaxInject")],
    },
    Capability {
        name: "dagger",
        description: "Dagger runtime with its compiler for main and unit-test sources",
        default_scope: Scope::Implementation,
        items: &[
            item("com.google.dagger", "dagger", "dagger"),
            pinned("com.google.dagger", "dagger-compiler", "dagger", Scope::Kapt),
            pinned("com.google.dagger", "dagger-compiler", "dagger", Scope::KaptTest),
        ],
    },
    Capability {
        name: "daggerAndroid",
        description: "Dagger Android extensions with their processors",
        default_scope: Scope::Implementation,
        items: &[
            item("com.google.dagger", "dagger-android", "dagger"),
            item("com.google.dagger", "dagger-android-support", "dagger"),
            pinned(
                "com.google.dagger",
                "dagger-android-processor",
                "dagger",
                Scope::Kapt,
            ),
            pinned(
                "com.google.dagger",
                "dagger-compiler",
                "dagger",
                Scope::KaptAndroidTest,
            ),
        ],
    },
    Capability {
        name: "androidAnnotation",
        description: "AndroidX annotations",
        default_scope: Scope::Implementation,
        items: &[item("androidx.annotation", "annotation", "androidAnnotation")],
    },
    Capability {
        name: "androidArchCore",
        description: "AndroidX arch core common and runtime",
        default_scope: Scope::Implementation,
        items: &[
            item("androidx.arch.core", "core-common", "androidxArch"),
            item("androidx.arch.core", "core-runtime", "androidxArch"),
        ],
    },
    Capability {
        name: "androidCore",
        description: "AndroidX core KTX",
        default_scope: Scope::Implementation,
        items: &[item("androidx.core", "core-ktx", "androidxCore")],
    },
    Capability {
        name: "activity",
        description: "AndroidX activity",
        default_scope: Scope::Implementation,
        items: &[
            item("androidx.activity", "activity", "activity"),
            item("androidx.activity", "activity-ktx", "activity"),
        ],
    },
    Capability {
        name: "fragment",
        description: "AndroidX fragment",
        default_scope: Scope::Implementation,
        items: &[
            item("androidx.fragment", "fragment", "fragment"),
            item("androidx.fragment", "fragment-ktx", "fragment"),
        ],
    },
    Capability {
        name: "recyclerView",
        description: "AndroidX RecyclerView",
        default_scope: Scope::Implementation,
        items: &[item("androidx.recyclerview", "recyclerview", "recyclerview")],
    },
    Capability {
        name: "constraintLayout",
        description: "AndroidX ConstraintLayout",
        default_scope: Scope::Implementation,
        items: &[item(
            "androidx.constraintlayout",
            "constraintlayout",
            "constraintLayout",
        )],
    },
    Capability {
        name: "androidLifecycle",
        description: "AndroidX lifecycle: viewmodel, livedata, runtime, service, process",
        default_scope: Scope::Implementation,
        items: &[
            item("androidx.lifecycle", "lifecycle-viewmodel-ktx", "lifecycle"),
            item("androidx.lifecycle", "lifecycle-livedata-core-ktx", "lifecycle"),
            item("androidx.lifecycle", "lifecycle-livedata-ktx", "lifecycle"),
            item("androidx.lifecycle", "lifecycle-runtime-ktx", "lifecycle"),
            item("androidx.lifecycle", "lifecycle-service", "lifecycle"),
            item("androidx.lifecycle", "lifecycle-process", "lifecycle"),
        ],
    },
    Capability {
        name: "androidLifecycleCompiler",
        description: "AndroidX lifecycle annotation processor",
        default_scope: Scope::Kapt,
        items: &[item("androidx.lifecycle", "lifecycle-compiler", "lifecycle")],
    },
    Capability {
        name: "androidAppCompat",
        description: "AndroidX AppCompat with resources",
        default_scope: Scope::Implementation,
        items: &[
            item("androidx.appcompat", "appcompat", "appcompat"),
            item("androidx.appcompat", "appcompat-resources", "appcompat"),
        ],
    },
    Capability {
        name: "androidNavigation",
        description: "AndroidX navigation fragment and UI",
        default_scope: Scope::Implementation,
        items: &[
            item(
                "androidx.navigation",
                "navigation-fragment-ktx",
                "androidNavigation",
            ),
            item("androidx.navigation", "navigation-ui-ktx", "androidNavigation"),
        ],
    },
    Capability {
        name: "slf4android",
        description: "slf4j binding for Android logcat",
        default_scope: Scope::Implementation,
        items: &[item("com.github.bright", "slf4android", "slf4android")],
    },
    Capability {
        name: "slf4j",
        description: "slf4j API",
        default_scope: Scope::Implementation,
        items: &[item("org.slf4j", "slf4j-api", "slf4j")],
    },
    Capability {
        name: "slf4jSimpleTestImpl",
        description: "Simple slf4j binding that prints logs in unit tests",
        default_scope: Scope::TestImplementation,
        items: &[item("org.slf4j", "slf4j-simple", "slf4j")],
    },
    Capability {
        name: "leakCanary",
        description: "LeakCanary memory leak detection for debug builds",
        default_scope: Scope::DebugImplementation,
        items: &[item(
            "com.squareup.leakcanary",
            "leakcanary-android",
            "leakCanary",
        )],
    },
    Capability {
        name: "junit",
        description: "JUnit 4",
        default_scope: Scope::TestImplementation,
        items: &[item("junit", "junit", "junit")],
    },
    Capability {
        name: "ut",
        description: "Unit test dependencies",
        default_scope: Scope::TestImplementation,
        items: &[item("junit", "junit", "junit")],
    },
    Capability {
        name: "compose",
        description: "Jetpack Compose UI, material and tooling preview",
        default_scope: Scope::Implementation,
        items: &[
            item("androidx.compose.ui", "ui", "compose"),
            item("androidx.compose.material", "material", "compose"),
            item("androidx.compose.ui", "ui-tooling-preview", "compose"),
        ],
    },
    Capability {
        name: "composeActivity",
        description: "Compose integration for activities",
        default_scope: Scope::Implementation,
        items: &[item(
            "androidx.activity",
            "activity-compose",
            "composeActivity",
        )],
    },
    Capability {
        name: "buildscriptClasspath",
        description: "Build plugins for the root build script",
        default_scope: Scope::Classpath,
        items: &[
            item("com.android.tools.build", "gradle", "androidGradlePlugin"),
            item("org.jetbrains.kotlin", "kotlin-gradle-plugin", "kotlin"),
            item("org.jetbrains.kotlin", "kotlin-serialization", "kotlin"),
            item(
                "androidx.navigation",
                "navigation-safe-args-gradle-plugin",
                "androidNavigation",
            ),
        ],
    },
];

pub fn get_capability(name: &str) -> Option<&'static Capability> {
    CAPABILITIES.iter().find(|c| c.name == name)
}

pub fn list_capabilities() -> &'static [Capability] {
    CAPABILITIES
}
