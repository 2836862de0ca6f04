use crate::domain::model::{CompanyProperties, CompanyRecord, SourceAddress, SourceClient};
use crate::utils::error::{Result, TransferError};

/// 將會計系統客戶轉為 CRM 公司記錄。來源缺少的欄位在目標同樣缺少
pub fn map_client(client: &SourceClient) -> CompanyRecord {
    let SourceClient {
        name,
        email,
        phone,
        address,
    } = client;

    let mut properties = CompanyProperties {
        name: name.clone(),
        phone: phone.clone(),
        ..Default::default()
    };

    if let Some(email) = email {
        properties.owneremail = Some(email.clone());
        // 沒有 `@` 時不設定 domain
        properties.domain = email
            .split_once('@')
            .map(|(_, domain)| domain.to_string());
    }

    if let Some(address) = address {
        let SourceAddress {
            address1,
            address2,
            state,
            zip_code,
            country,
        } = address;

        properties.address = address1.clone();
        properties.address2 = address2.clone();
        properties.state = state.clone();
        properties.zip = zip_code.clone();
        properties.country = country.clone();
    }

    CompanyRecord {
        id: None,
        properties,
    }
}

/// 映射整批客戶；任一筆缺少名稱即中止
pub fn map_clients(clients: &[SourceClient]) -> Result<Vec<CompanyRecord>> {
    clients
        .iter()
        .enumerate()
        .map(|(index, client)| {
            if client.name.is_none() {
                return Err(TransferError::MappingError {
                    index,
                    message: "client has no name to match on".to_string(),
                });
            }
            Ok(map_client(client))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_client() -> SourceClient {
        serde_json::from_value(serde_json::json!({
            "name": "clientName",
            "email": "client@email.test",
            "phone": "123-4 12 34 56",
            "address": {
                "address1": "first address",
                "address2": "second address",
                "zip-code": "zip code",
                "state": "state",
                "country": "country"
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_map_all_properties() {
        let record = map_client(&full_client());

        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            serde_json::json!({
                "properties": {
                    "name": "clientName",
                    "owneremail": "client@email.test",
                    "phone": "123-4 12 34 56",
                    "domain": "email.test",
                    "address": "first address",
                    "address2": "second address",
                    "zip": "zip code",
                    "state": "state",
                    "country": "country"
                }
            })
        );
    }

    #[test]
    fn test_map_name_only() {
        let record = map_client(&SourceClient::named("clientName"));

        assert_eq!(
            record,
            CompanyRecord {
                id: None,
                properties: CompanyProperties {
                    name: Some("clientName".to_string()),
                    ..Default::default()
                },
            }
        );
    }

    #[test]
    fn test_map_partial_address() {
        let client = SourceClient {
            phone: Some("123-4 12 34 56".to_string()),
            address: Some(SourceAddress {
                address1: Some("first address".to_string()),
                state: Some("state".to_string()),
                country: Some("country".to_string()),
                ..Default::default()
            }),
            ..SourceClient::named("clientName")
        };

        let properties = map_client(&client).properties;

        assert_eq!(properties.address.as_deref(), Some("first address"));
        assert_eq!(properties.state.as_deref(), Some("state"));
        assert_eq!(properties.country.as_deref(), Some("country"));
        assert_eq!(properties.address2, None);
        assert_eq!(properties.zip, None);
        assert_eq!(properties.owneremail, None);
        assert_eq!(properties.domain, None);
    }

    #[test]
    fn test_email_without_at_sign_has_no_domain() {
        let client = SourceClient {
            email: Some("client.se".to_string()),
            ..SourceClient::named("clientName")
        };

        let properties = map_client(&client).properties;

        assert_eq!(properties.owneremail.as_deref(), Some("client.se"));
        assert_eq!(properties.domain, None);
    }

    #[test]
    fn test_domain_is_text_after_first_at_sign() {
        let client = SourceClient {
            email: Some("a@b.com".to_string()),
            ..SourceClient::named("x")
        };
        assert_eq!(map_client(&client).properties.domain.as_deref(), Some("b.com"));

        let client = SourceClient {
            email: Some("odd@name@host.se".to_string()),
            ..SourceClient::named("x")
        };
        assert_eq!(
            map_client(&client).properties.domain.as_deref(),
            Some("name@host.se")
        );
    }

    #[test]
    fn test_map_clients_fails_fast_on_missing_name() {
        let clients = vec![
            SourceClient::named("first"),
            SourceClient {
                email: Some("anon@host.se".to_string()),
                ..Default::default()
            },
            SourceClient::named("third"),
        ];

        match map_clients(&clients) {
            Err(TransferError::MappingError { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected mapping error, got {:?}", other),
        }
    }

    #[test]
    fn test_map_clients_preserves_order() {
        let clients = vec![SourceClient::named("b"), SourceClient::named("a")];
        let records = map_clients(&clients).unwrap();

        let names: Vec<_> = records.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec![Some("b"), Some("a")]);
    }
}
