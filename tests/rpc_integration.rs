// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the XML-RPC transport and codec using wiremock.

use ccu_bridge::error::{Error, ParseError, RpcError};
use ccu_bridge::rpc::{MemberValue, RpcClient};
use wiremock::matchers::{body_string, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> RpcClient {
    let address = server.address();
    RpcClient::new(address.ip().to_string(), address.port()).unwrap()
}

fn paramset_response(members: &str) -> String {
    format!(
        "<methodResponse><params><param><value><struct>{members}</struct></value></param></params></methodResponse>"
    )
}

const ACK_RESPONSE: &str =
    "<methodResponse><params><param><value></value></param></params></methodResponse>";

const FAULT_RESPONSE: &str = "<methodResponse><fault><value><struct>\
    <member><name>faultCode</name><value><i4>-5</i4></value></member>\
    <member><name>faultString</name><value>Unknown parameter</value></member>\
    </struct></value></fault></methodResponse>";

// ============================================================================
// Transport Tests
// ============================================================================

mod transport {
    use super::*;

    #[tokio::test]
    async fn get_paramset_posts_exact_body_and_headers() {
        let mock_server = MockServer::start().await;

        let expected_body = concat!(
            "<methodCall><methodName>getParamset</methodName><params>",
            "<param><value><string>OEQ0123456:4</string></value></param>",
            "<param><value><string>VALUES</string></value></param>",
            "</params></methodCall>"
        );
        Mock::given(method("POST"))
            .and(path("/"))
            .and(header("content-type", "text/xml"))
            .and(header("accept", "text/xml"))
            .and(body_string(expected_body))
            .respond_with(ResponseTemplate::new(200).set_body_string(paramset_response(
                "<member><name>ACTUAL_TEMPERATURE</name><value><double>21.5</double></value></member>\
                 <member><name>VALVE_STATE</name><value><i4>47</i4></value></member>",
            )))
            .expect(1)
            .mount(&mock_server)
            .await;

        let members = client_for(&mock_server)
            .get_paramset("OEQ0123456", 4)
            .await
            .unwrap();

        assert_eq!(members.len(), 2);
        assert_eq!(members[0].name, "ACTUAL_TEMPERATURE");
        assert_eq!(members[0].value, MemberValue::Double(21.5));
        assert_eq!(members[1].value, MemberValue::Int(47));
    }

    #[tokio::test]
    async fn non_200_status_is_a_transport_failure() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server)
            .get_paramset("OEQ0123456", 0)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Rpc(RpcError::Status(500))));
    }

    #[tokio::test]
    async fn error_page_body_is_not_parsed_on_non_200() {
        let mock_server = MockServer::start().await;

        // a valid XML body must not rescue a failed status
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string(ACK_RESPONSE))
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server)
            .set_value("OEQ0123456", 4, "SET_TEMPERATURE", 21.5)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Rpc(RpcError::Status(503))));
    }

    #[tokio::test]
    async fn connection_refused_reports_a_connection_failure() {
        // nothing listens on the discard port
        let client = RpcClient::new("127.0.0.1", 1).unwrap();
        let err = client.get_paramset("OEQ0123456", 0).await.unwrap_err();
        assert!(matches!(err, Error::Rpc(RpcError::ConnectionFailed(_))));
    }

    #[tokio::test]
    async fn unparseable_200_body_is_malformed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not xml at all"))
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server)
            .get_paramset("OEQ0123456", 0)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[tokio::test]
    async fn response_without_params_or_fault_is_malformed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<methodResponse></methodResponse>"),
            )
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server)
            .get_paramset("OEQ0123456", 0)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Parse(ParseError::EmptyResponse)));
    }
}

// ============================================================================
// Poll Decode Tests
// ============================================================================

mod poll_decode {
    use super::*;

    #[tokio::test]
    async fn fault_on_poll_is_a_protocol_fault() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(FAULT_RESPONSE))
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server)
            .get_paramset("OEQ0123456", 0)
            .await
            .unwrap_err();
        match err {
            Error::Rpc(RpcError::Fault { code, message }) => {
                assert_eq!(code, Some(-5));
                assert_eq!(message.as_deref(), Some("Unknown parameter"));
            }
            other => panic!("expected fault, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_member_struct_is_a_decode_failure() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(paramset_response("")))
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server)
            .get_paramset("OEQ0123456", 0)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Parse(ParseError::NoMembers)));
    }

    #[tokio::test]
    async fn unrecognized_member_kinds_are_skipped() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(paramset_response(
                "<member><name>PARTY_MODE_SUBMIT</name><value><base64>AA==</base64></value></member>\
                 <member><name>LOWBAT</name><value><boolean>0</boolean></value></member>",
            )))
            .mount(&mock_server)
            .await;

        let members = client_for(&mock_server)
            .get_paramset("OEQ0123456", 0)
            .await
            .unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].name, "LOWBAT");
        assert_eq!(members[0].value, MemberValue::Bool(false));
    }
}

// ============================================================================
// Write Path Tests
// ============================================================================

mod write_path {
    use super::*;

    #[tokio::test]
    async fn set_value_posts_typed_body_and_acks() {
        let mock_server = MockServer::start().await;

        let expected_body = concat!(
            "<methodCall><methodName>setValue</methodName><params>",
            "<param><value><string>OEQ0123456:4</string></value></param>",
            "<param><value><string>SET_TEMPERATURE</string></value></param>",
            "<param><value><double>21.5</double></value></param>",
            "</params></methodCall>"
        );
        Mock::given(method("POST"))
            .and(body_string(expected_body))
            .respond_with(ResponseTemplate::new(200).set_body_string(ACK_RESPONSE))
            .expect(1)
            .mount(&mock_server)
            .await;

        client_for(&mock_server)
            .set_value("OEQ0123456", 4, "SET_TEMPERATURE", 21.5)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn boolean_write_serializes_as_numeric() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(body_string_contains("<boolean>1</boolean>"))
            .respond_with(ResponseTemplate::new(200).set_body_string(ACK_RESPONSE))
            .expect(1)
            .mount(&mock_server)
            .await;

        client_for(&mock_server)
            .set_value("LEQ0654321", 1, "STATE", true)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn fault_rejects_the_write_despite_http_200() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(FAULT_RESPONSE))
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server)
            .set_value("OEQ0123456", 4, "SET_TEMPERATURE", 21.5)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Rpc(RpcError::Fault { .. })));
    }
}

// ============================================================================
// Diagnostics Tests
// ============================================================================

mod diagnostics {
    use super::*;

    fn rssi_response() -> String {
        paramset_response(
            "<member><name>OEQ0123456</name><value><struct>\
             <member><name>CENTRAL</name><value><array><data>\
             <value><i4>-40</i4></value><value><i4>-50</i4></value>\
             </data></array></value></member>\
             </struct></value></member>",
        )
    }

    #[tokio::test]
    async fn rssi_info_extracts_pair_for_serial() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(body_string(
                "<methodCall><methodName>rssiInfo</methodName><params></params></methodCall>",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_string(rssi_response()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let pair = client_for(&mock_server)
            .rssi_pair("OEQ0123456")
            .await
            .unwrap();
        assert_eq!(pair, Some((-40, -50)));
    }

    #[tokio::test]
    async fn rssi_info_missing_serial_is_none() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(rssi_response()))
            .mount(&mock_server)
            .await;

        let pair = client_for(&mock_server)
            .rssi_pair("ZZZ9999999")
            .await
            .unwrap();
        assert_eq!(pair, None);
    }

    #[tokio::test]
    async fn device_description_uses_bare_address() {
        let mock_server = MockServer::start().await;

        let expected_body = concat!(
            "<methodCall><methodName>getDeviceDescription</methodName><params>",
            "<param><value><string>OEQ0123456</string></value></param>",
            "</params></methodCall>"
        );
        Mock::given(method("POST"))
            .and(body_string(expected_body))
            .respond_with(ResponseTemplate::new(200).set_body_string(paramset_response(
                "<member><name>TYPE</name><value>HM-CC-RT-DN</value></member>\
                 <member><name>FIRMWARE</name><value><string>1.4</string></value></member>",
            )))
            .expect(1)
            .mount(&mock_server)
            .await;

        let pairs = client_for(&mock_server)
            .device_description("OEQ0123456")
            .await
            .unwrap();
        assert_eq!(pairs[0], ("TYPE".to_string(), "HM-CC-RT-DN".to_string()));
        assert_eq!(pairs[1], ("FIRMWARE".to_string(), "1.4".to_string()));
    }
}
