use candle_core::{DType, Device, Tensor};
use paperrag_core::config::EncoderSettings;
use paperrag_core::error::Error;
use paperrag_embed::pool::{l2_normalize, masked_mean};
use paperrag_embed::tokenize::{load_tokenizer, tokenize_query};
use paperrag_embed::{Encoders, CLIP_DIM, MINILM_DIM};

#[test]
fn fake_encoders_have_the_model_dimensions() {
    let settings = EncoderSettings { fake: true, ..EncoderSettings::default() };
    let encoders = Encoders::load(&settings).expect("encoders");
    assert_eq!(encoders.text.dim(), MINILM_DIM);
    assert_eq!(encoders.image.dim(), CLIP_DIM);

    let t = encoders.text.encode("is there a paper on mice?").expect("text");
    let i = encoders.image.encode("is there a paper on mice?").expect("image");
    assert_eq!(t.dim(), 384);
    assert_eq!(i.dim(), 512);
}

#[test]
fn missing_model_dir_is_a_config_error() {
    let tmp = tempfile::tempdir().expect("tmp");
    let settings = EncoderSettings {
        text_model_dir: tmp.path().join("nope").to_string_lossy().to_string(),
        image_model_dir: tmp.path().join("nope").to_string_lossy().to_string(),
        fake: false,
    };
    match Encoders::load(&settings) {
        Err(Error::InvalidConfig(msg)) => assert!(msg.contains("tokenizer.json"), "{msg}"),
        Err(other) => panic!("expected InvalidConfig, got {other}"),
        Ok(_) => panic!("expected InvalidConfig, got encoders"),
    }
}

#[test]
fn masked_mean_ignores_padding_then_normalizes() {
    let dev = Device::Cpu;
    // Two tokens with hidden dim 4; second token is masked out.
    let h = Tensor::from_slice(&[1.0f32, 2.0, 3.0, 4.0,  // token 0
                                 5.0, 6.0, 7.0, 8.0],    // token 1
                               (1, 2, 4), &dev).unwrap();
    let mask = Tensor::from_slice(&[1u32, 0u32], (1, 2), &dev).unwrap();
    let out = l2_normalize(&masked_mean(&h, &mask).unwrap()).unwrap();
    let v: Vec<Vec<f32>> = out.to_dtype(DType::F32).unwrap().to_vec2().unwrap();
    let v = &v[0];
    let norm: f32 = (1.0f32*1.0 + 2.0*2.0 + 3.0*3.0 + 4.0*4.0).sqrt();
    let expected = [1.0/norm, 2.0/norm, 3.0/norm, 4.0/norm];
    for (a,b) in v.iter().cloned().zip(expected) {
        assert!((a - b).abs() < 1e-5, "a={} b={}", a, b);
    }
}

#[test]
fn tokenizer_file_truncation_does_not_override_encoder_limit() {
    let tmp = tempfile::tempdir().expect("tmp");
    let path = tmp.path().join("tokenizer.json");
    let json = r#"{
        "version": "1.0",
        "truncation": {"direction": "Right", "max_length": 2, "strategy": "LongestFirst", "stride": 0},
        "padding": null,
        "added_tokens": [],
        "normalizer": null,
        "pre_tokenizer": {"type": "Whitespace"},
        "post_processor": null,
        "decoder": null,
        "model": {"type": "WordLevel", "vocab": {"[UNK]": 0, "mice": 1, "in": 2, "space": 3}, "unk_token": "[UNK]"}
    }"#;
    std::fs::write(&path, json).expect("write");

    let tokenizer = load_tokenizer(&path).expect("tokenizer");
    assert!(tokenizer.get_truncation().is_none());
    let (ids, mask) = tokenize_query(&tokenizer, "mice in space", 256, &Device::Cpu).expect("tokenize");
    assert_eq!(ids.dims(), &[1, 3]);
    assert_eq!(mask.dims(), &[1, 3]);

    let (ids, _) = tokenize_query(&tokenizer, "mice in space", 2, &Device::Cpu).expect("tokenize");
    assert_eq!(ids.dims(), &[1, 2]);
}
