use serde::Deserialize;

use super::typedefs::Protocol;

#[derive(Deserialize, Debug)]
pub struct HubMessagesResponse {
    #[serde(default)]
    pub messages: Vec<HubMessage>,
}

#[derive(Deserialize, Debug)]
pub struct HubMessage {
    pub data: Option<HubMessageData>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct HubMessageData {
    pub verification_add_address_body: Option<VerificationBody>,
    // Older hubs, and some newer ones alongside the field above
    pub verification_add_eth_address_body: Option<VerificationBody>,
}

impl HubMessageData {
    pub fn verification(&self) -> Option<&VerificationBody> {
        self.verification_add_address_body
            .as_ref()
            .or(self.verification_add_eth_address_body.as_ref())
    }
}

#[derive(Deserialize, Debug)]
pub struct VerificationBody {
    pub address: String,
    // Absent on verifications made before multi-protocol support
    pub protocol: Option<Protocol>,
}
