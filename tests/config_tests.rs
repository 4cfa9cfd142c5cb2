use std::time::Duration;

use album_viewer::config::Configuration;

#[test]
fn parse_kebab_case_config() {
    let yaml = r#"
container: stage
fade-step: 5
fade-time: 20ms
slideshow-delay: 3s
slideshow-random: true
endless-album: false
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    let cfg = cfg.validated().unwrap();
    assert_eq!(cfg.container.as_deref(), Some("stage"));
    assert_eq!(cfg.fade_step, 5);
    assert_eq!(cfg.fade_time, Duration::from_millis(20));
    assert_eq!(cfg.slideshow_delay, Duration::from_secs(3));
    assert!(cfg.slideshow_random);
    assert!(!cfg.endless_album);
}

#[test]
fn defaults_fill_missing_keys() {
    let cfg: Configuration = serde_yaml::from_str("container: stage").unwrap();
    assert_eq!(cfg.blank_image, "images/blank.png");
    assert_eq!(cfg.fade_step, 2);
    assert_eq!(cfg.fade_time, Duration::from_millis(12));
    assert_eq!(cfg.slideshow_delay, Duration::from_millis(5000));
    assert_eq!(cfg.loading_grace, Duration::from_millis(10));
    assert!(cfg.endless_album);
    assert!(cfg.fade_both);
    assert!(cfg.enable_links);
    assert_eq!(cfg.random_seed, None);
    assert_eq!(cfg.loader_max_concurrent_loads, 4);
}

#[test]
fn parse_prebuilt_elements() {
    let yaml = r#"
enable-links: false
elements:
  container1: t1
  img1: i1
  container2: t2
  img2: i2
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    let cfg = cfg.validated().unwrap();
    let elements = cfg.elements.unwrap();
    assert_eq!(elements.img2, "i2");
    assert_eq!(elements.link1, None);
    assert!(!cfg.enable_links);
}

#[test]
fn unknown_keys_are_rejected() {
    assert!(serde_yaml::from_str::<Configuration>("container: a\nfade-speed: 3").is_err());
    assert!(serde_yaml::from_str::<Configuration>("elements: {img3: x}").is_err());
}

#[test]
fn validation_rejects_out_of_range_values() {
    let base = || Configuration {
        container: Some("stage".into()),
        ..Configuration::default()
    };
    assert!(base().validated().is_ok());
    assert!(
        Configuration {
            fade_step: 0,
            ..base()
        }
        .validated()
        .is_err()
    );
    assert!(
        Configuration {
            fade_step: 101,
            ..base()
        }
        .validated()
        .is_err()
    );
    assert!(
        Configuration {
            fade_time: Duration::ZERO,
            ..base()
        }
        .validated()
        .is_err()
    );
    assert!(
        Configuration {
            loader_max_concurrent_loads: 0,
            ..base()
        }
        .validated()
        .is_err()
    );
    assert!(
        Configuration {
            container: Some("  ".into()),
            ..base()
        }
        .validated()
        .is_err()
    );
    assert!(Configuration::default().validated().is_err());
}

#[test]
fn from_yaml_file_reads_config() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("viewer.yaml");
    std::fs::write(&path, "container: stage\nrandom-seed: 42\n").unwrap();
    let cfg = Configuration::from_yaml_file(&path).unwrap();
    assert_eq!(cfg.random_seed, Some(42));
    assert!(Configuration::from_yaml_file(tmp.path().join("absent.yaml")).is_err());
}
