use std::time::Duration;

use lygia_resolver::core::{FetchFailure, IncludeError};
use lygia_resolver::resolver::Resolver;
use lygia_resolver::test_utils::{ShaderProject, StaticFetcher};

#[tokio::test]
async fn test_second_pass_is_served_from_cache() {
    let project = ShaderProject::new().unwrap();
    let main = project.write("main.frag", "#include \"lygia/math/const.glsl\"").unwrap();
    let fetcher = StaticFetcher::new().with_document("/math/const.glsl", "PI");
    let requests = fetcher.clone();

    let first = Resolver::with_fetcher(&project.config(), fetcher.clone()).unwrap();
    first.resolve_file(&main).await.unwrap();
    assert_eq!(requests.request_count(), 1);
    assert_eq!(requests.requested_urls(), vec!["https://lygia.xyz/math/const.glsl"]);
    assert!(project.cache_dir().join("math").join("const.glsl").is_file());

    // A fresh session (new process) still hits the on-disk cache.
    let second = Resolver::with_fetcher(&project.config(), fetcher).unwrap();
    assert_eq!(second.resolve_file(&main).await.unwrap(), "PI");
    assert_eq!(requests.request_count(), 1);
}

#[tokio::test]
async fn test_seeded_cache_works_offline() {
    let project = ShaderProject::new().unwrap();
    project.seed_cache("/math/const.glsl", "#define PI 3.14").unwrap();
    let main = project.write("main.frag", "#include \"lygia/math/const.glsl\"").unwrap();
    let fetcher = StaticFetcher::new().with_failure(
        "/math/const.glsl",
        FetchFailure::Transport("network unreachable".to_string()),
    );
    let requests = fetcher.clone();

    let resolver = Resolver::with_fetcher(&project.config(), fetcher).unwrap();
    assert_eq!(resolver.resolve_file(&main).await.unwrap(), "#define PI 3.14");
    assert_eq!(requests.request_count(), 0);
}

#[tokio::test]
async fn test_shared_document_is_fetched_once_per_pass() {
    let project = ShaderProject::new().unwrap();
    project.write("a.glsl", "#include \"lygia/math/const.glsl\"\nA").unwrap();
    project.write("b.glsl", "#include \"lygia/math/const.glsl\"\nB").unwrap();
    let main = project.write("main.frag", "#include \"a.glsl\"\n#include \"b.glsl\"").unwrap();
    let fetcher = StaticFetcher::new()
        .with_document("/math/const.glsl", "PI")
        .with_latency(Duration::from_millis(30));
    let requests = fetcher.clone();

    let resolver = Resolver::with_fetcher(&project.config(), fetcher).unwrap();
    assert_eq!(resolver.resolve_file(&main).await.unwrap(), "PI\nA\nPI\nB");
    assert_eq!(requests.request_count(), 1);
}

#[tokio::test]
async fn test_fetch_error_carries_url_and_status() {
    let project = ShaderProject::new().unwrap();
    let main = project.write("main.frag", "#include \"lygia/does/not/exist.glsl\"").unwrap();

    let resolver = Resolver::with_fetcher(&project.config(), StaticFetcher::new()).unwrap();
    let err = resolver.resolve_file(&main).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Failed to fetch https://lygia.xyz/does/not/exist.glsl: HTTP status 404"
    );
    assert!(!project.cache_dir().join("does").exists());
}

#[tokio::test]
async fn test_custom_remote_base_and_namespace() {
    let project = ShaderProject::new().unwrap();
    let main = project.write("main.frag", "#include \"mylib/noise.glsl\"").unwrap();
    let fetcher = StaticFetcher::new().with_document("/noise.glsl", "noise");
    let requests = fetcher.clone();

    let mut config = project.config();
    config.namespace = "mylib".to_string();
    config.remote_base = "https://shaders.example.com/".to_string();
    let resolver = Resolver::with_fetcher(&config, fetcher).unwrap();

    assert_eq!(resolver.resolve_file(&main).await.unwrap(), "noise");
    assert_eq!(requests.requested_urls(), vec!["https://shaders.example.com/noise.glsl"]);
}

#[tokio::test]
async fn test_transient_failure_exhausts_retries() {
    let project = ShaderProject::new().unwrap();
    let main = project.write("main.frag", "#include \"lygia/flaky.glsl\"").unwrap();
    let fetcher = StaticFetcher::new().with_failure("/flaky.glsl", FetchFailure::Status(502));
    let requests = fetcher.clone();

    let mut config = project.config();
    config.fetch_retries = 1;
    let resolver = Resolver::with_fetcher(&config, fetcher).unwrap();

    let err = resolver.resolve_file(&main).await.unwrap_err();
    assert!(matches!(
        err,
        IncludeError::Fetch {
            cause: FetchFailure::Status(502),
            ..
        }
    ));
    assert_eq!(requests.request_count(), 2);
}
