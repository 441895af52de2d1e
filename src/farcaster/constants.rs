pub const VERIFICATIONS_BY_FID: &str = "/v1/verificationsByFid";
