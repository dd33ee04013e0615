use lazy_static::lazy_static;
use rand::thread_rng;
use serde_json::Value;
use torus_secp256k1::*;

#[test]
fn check_interpolation() {
    let rng = thread_rng();

    torus_core::tests::ciphersuite_generic::check_interpolation::<Secp256K1Keccak256, _>(rng);
}

#[test]
fn check_interpolation_with_custom_indexes() {
    let rng = thread_rng();

    torus_core::tests::ciphersuite_generic::check_interpolation_with_custom_indexes::<
        Secp256K1Keccak256,
        _,
    >(rng);
}

#[test]
fn check_duplicated_indexes() {
    torus_core::tests::ciphersuite_generic::check_duplicated_indexes::<Secp256K1Keccak256>();
}

#[test]
fn check_reconstruct() {
    let rng = thread_rng();

    torus_core::tests::ciphersuite_generic::check_reconstruct::<Secp256K1Keccak256, _>(rng);
}

#[test]
fn check_share_decryption() {
    let rng = thread_rng();

    torus_core::tests::ciphersuite_generic::check_share_decryption::<Secp256K1Keccak256, _>(rng);
}

#[test]
fn check_share_decryption_errors() {
    let rng = thread_rng();

    torus_core::tests::ciphersuite_generic::check_share_decryption_errors::<Secp256K1Keccak256, _>(
        rng,
    );
}

#[test]
fn check_key_encodings() {
    let rng = thread_rng();

    torus_core::tests::ciphersuite_generic::check_key_encodings::<Secp256K1Keccak256, _>(rng);
}

#[tokio::test]
async fn check_retrieve_shares() {
    let rng = thread_rng();

    torus_core::tests::retrieval::check_retrieve_shares::<Secp256K1Keccak256, _>(rng).await;
}

#[tokio::test]
async fn check_retrieve_shares_with_faulty_nodes() {
    let rng = thread_rng();

    torus_core::tests::retrieval::check_retrieve_shares_with_faulty_nodes::<Secp256K1Keccak256, _>(
        rng,
    )
    .await;
}

#[tokio::test]
async fn check_commitment_quorum() {
    let rng = thread_rng();

    torus_core::tests::retrieval::check_commitment_quorum::<Secp256K1Keccak256, _>(rng).await;
}

#[tokio::test]
async fn check_share_request_quorum() {
    let rng = thread_rng();

    torus_core::tests::retrieval::check_share_request_quorum::<Secp256K1Keccak256, _>(rng).await;
}

#[tokio::test]
async fn check_public_key_agreement() {
    let rng = thread_rng();

    torus_core::tests::retrieval::check_public_key_agreement::<Secp256K1Keccak256, _>(rng).await;
}

#[tokio::test]
async fn check_reconstruction_failure() {
    let rng = thread_rng();

    torus_core::tests::retrieval::check_reconstruction_failure::<Secp256K1Keccak256, _>(rng).await;
}

#[tokio::test]
async fn check_get_public_address() {
    let rng = thread_rng();

    torus_core::tests::retrieval::check_get_public_address::<Secp256K1Keccak256, _>(rng).await;
}

#[tokio::test]
async fn check_get_public_address_assigns_key() {
    let rng = thread_rng();

    torus_core::tests::retrieval::check_get_public_address_assigns_key::<Secp256K1Keccak256, _>(
        rng,
    )
    .await;
}

#[tokio::test]
async fn check_get_public_address_failures() {
    let rng = thread_rng();

    torus_core::tests::retrieval::check_get_public_address_failures::<Secp256K1Keccak256, _>(rng)
        .await;
}

lazy_static! {
    pub static ref VECTORS: Value =
        serde_json::from_str(include_str!("../tests/helpers/vectors.json").trim())
            .expect("Test vector is valid JSON");
}

#[test]
fn check_addresses_with_test_vectors() {
    for key in VECTORS["keys"].as_array().unwrap() {
        let private_key = key["private_key"].as_str().unwrap();
        let address = key["address"].as_str().unwrap();

        assert_eq!(generate_address_from_priv_key(private_key).unwrap(), address);

        let public_key = PrivateKey::from_hex(private_key).unwrap().public_key();
        assert_eq!(public_key.address().unwrap(), address);
        if let (Some(x), Some(y)) = (key["public_key_x"].as_str(), key["public_key_y"].as_str()) {
            assert_eq!(public_key.coordinates_hex().unwrap(), (x.to_string(), y.to_string()));
            assert_eq!(PublicKey::from_coordinates(x, y).unwrap(), public_key);
        }
    }
}

#[test]
fn check_private_key_hex_is_minimal() {
    let key = PrivateKey::from_hex(
        "0x0000000000000000000000000000000000000000000000000000000000000002",
    )
    .unwrap();
    assert_eq!(key.to_hex(), "2");
}
