//! Well-known claim type namespace.
//!
//! Short keys are what callers type and see (`Name`, `Email`, ...); the URIs
//! are what identity providers persist. The table is fixed for the lifetime
//! of the process.

const XMLSOAP: &str = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/";
const MICROSOFT: &str = "http://schemas.microsoft.com/ws/2008/06/identity/claims/";

/// Short key of the claim carrying a user's display name
pub const NAME: &str = "Name";

/// Canonical URI of the display-name claim
pub const NAME_CLAIM_TYPE: &str = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/name";

/// `(short key, claim type URI suffix, namespace)` for every well-known claim type
const TABLE: &[(&str, &str, &str)] = &[
    ("Actor", "actor", XMLSOAP),
    ("Anonymous", "anonymous", XMLSOAP),
    ("Authentication", "authentication", XMLSOAP),
    ("AuthenticationInstant", "authenticationinstant", MICROSOFT),
    ("AuthenticationMethod", "authenticationmethod", MICROSOFT),
    ("AuthorizationDecision", "authorizationdecision", XMLSOAP),
    ("CookiePath", "cookiepath", MICROSOFT),
    ("Country", "country", XMLSOAP),
    ("DateOfBirth", "dateofbirth", XMLSOAP),
    ("DenyOnlyPrimaryGroupSid", "denyonlyprimarygroupsid", MICROSOFT),
    ("DenyOnlyPrimarySid", "denyonlyprimarysid", MICROSOFT),
    ("DenyOnlySid", "denyonlysid", XMLSOAP),
    ("Dns", "dns", XMLSOAP),
    ("Dsa", "dsa", XMLSOAP),
    ("Email", "emailaddress", XMLSOAP),
    ("Expiration", "expiration", MICROSOFT),
    ("Expired", "expired", MICROSOFT),
    ("Gender", "gender", XMLSOAP),
    ("GivenName", "givenname", XMLSOAP),
    ("GroupSid", "groupsid", MICROSOFT),
    ("Hash", "hash", XMLSOAP),
    ("HomePhone", "homephone", XMLSOAP),
    ("IsPersistent", "ispersistent", MICROSOFT),
    ("Locality", "locality", XMLSOAP),
    ("MobilePhone", "mobilephone", XMLSOAP),
    ("Name", "name", XMLSOAP),
    ("NameIdentifier", "nameidentifier", XMLSOAP),
    ("OtherPhone", "otherphone", XMLSOAP),
    ("PostalCode", "postalcode", XMLSOAP),
    ("PrimaryGroupSid", "primarygroupsid", MICROSOFT),
    ("PrimarySid", "primarysid", MICROSOFT),
    ("Role", "role", MICROSOFT),
    ("Rsa", "rsa", XMLSOAP),
    ("SerialNumber", "serialnumber", MICROSOFT),
    ("Sid", "sid", XMLSOAP),
    ("Spn", "spn", XMLSOAP),
    ("StateOrProvince", "stateorprovince", XMLSOAP),
    ("StreetAddress", "streetaddress", XMLSOAP),
    ("Surname", "surname", XMLSOAP),
    ("System", "system", XMLSOAP),
    ("Thumbprint", "thumbprint", XMLSOAP),
    ("Upn", "upn", XMLSOAP),
    ("Uri", "uri", XMLSOAP),
    ("UserData", "userdata", MICROSOFT),
    ("Version", "version", MICROSOFT),
    ("Webpage", "webpage", XMLSOAP),
    ("WindowsAccountName", "windowsaccountname", MICROSOFT),
    ("X500DistinguishedName", "x500distinguishedname", XMLSOAP),
];

/// Iterates `(short key, claim type URI)` over the well-known namespace
pub fn well_known() -> impl Iterator<Item = (&'static str, String)> {
    TABLE
        .iter()
        .map(|(key, suffix, namespace)| (*key, format!("{namespace}{suffix}")))
}
