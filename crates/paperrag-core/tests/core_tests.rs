use figment::Jail;

use paperrag_core::config::{Config, IndexBackend};
use paperrag_core::error::Error;

fn load(jail_env: &str) -> Config {
    Config::from_figment(Config::figment_for_env(jail_env))
}

#[test]
fn defaults_match_the_hosted_deployment() {
    Jail::expect_with(|jail| {
        jail.set_env("PINECONE_API_KEY", "pc-key");
        jail.set_env("GOOGLE_API_KEY", "g-key");
        let settings = load("dev").settings().map_err(|e| e.to_string())?;

        assert_eq!(settings.retrieval.top_k_text, 5);
        assert_eq!(settings.retrieval.top_k_image, 3);
        assert_eq!(settings.text_index.name, "my-multimodal-rag-text");
        assert_eq!(settings.image_index.name, "my-multimodal-rag-image");
        assert_eq!(settings.text_index.api_key.as_deref(), Some("pc-key"));
        assert_eq!(settings.image_index.api_key.as_deref(), Some("pc-key"));
        assert_eq!(settings.llm.api_key.as_deref(), Some("g-key"));
        assert_eq!(settings.llm.model, "gemini-2.5-pro");
        assert!(!settings.encoders.fake);
        Ok(())
    });
}

#[test]
fn env_file_and_app_vars_layer_in_order() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
            [retrieval]
            top_k_text = 7

            [image_index]
            backend = "lance"
            uri = "data/lance"
            name = "figures"
            "#,
        )?;
        jail.create_file("config.prod.toml", "[retrieval]\ntop_k_text = 9\n")?;
        jail.set_env("PINECONE_API_KEY", "pc-key");
        jail.set_env("GOOGLE_API_KEY", "g-key");
        jail.set_env("APP_RETRIEVAL__TOP_K_IMAGE", "4");
        jail.set_env("APP_USE_FAKE_EMBEDDINGS", "true");

        let config = load("prod");
        let settings = config.settings().map_err(|e| e.to_string())?;
        assert_eq!(settings.retrieval.top_k_text, 9);
        assert_eq!(settings.retrieval.top_k_image, 4);
        assert_eq!(settings.image_index.backend, IndexBackend::Lance);
        assert_eq!(settings.image_index.name, "figures");
        assert_eq!(settings.text_index.backend, IndexBackend::Pinecone);
        assert!(settings.encoders.fake);

        let top_k: usize = config.get("retrieval.top_k_text").map_err(|e| e.to_string())?;
        assert_eq!(top_k, 9);
        Ok(())
    });
}

#[test]
fn numeric_fake_embeddings_flag_reads_as_bool() {
    Jail::expect_with(|jail| {
        jail.set_env("PINECONE_API_KEY", "pc-key");
        jail.set_env("GOOGLE_API_KEY", "g-key");
        jail.set_env("APP_USE_FAKE_EMBEDDINGS", "1");
        let settings = load("dev").settings().map_err(|e| e.to_string())?;
        assert!(settings.encoders.fake);

        jail.set_env("APP_USE_FAKE_EMBEDDINGS", "0");
        let config = load("dev");
        assert!(!config.settings().map_err(|e| e.to_string())?.encoders.fake);
        let fake: bool = config.get("encoders.fake").map_err(|e| e.to_string())?;
        assert!(!fake);
        Ok(())
    });
}

#[test]
fn missing_credentials_are_rejected() {
    Jail::expect_with(|_jail| {
        match load("test").settings() {
            Err(Error::InvalidConfig(msg)) => assert!(msg.contains("api_key"), "{msg}"),
            other => panic!("expected InvalidConfig, got {other:?}"),
        }
        Ok(())
    });
}

#[test]
fn zero_default_top_k_is_rejected() {
    Jail::expect_with(|jail| {
        jail.set_env("PINECONE_API_KEY", "pc-key");
        jail.set_env("GOOGLE_API_KEY", "g-key");
        jail.set_env("APP_RETRIEVAL__TOP_K_TEXT", "0");
        assert!(matches!(load("dev").settings(), Err(Error::InvalidConfig(_))));
        Ok(())
    });
}
