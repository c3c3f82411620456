//! Salesforce metadata dialect for `metadiff_xml`.
//!
//! This crate provides the identity rules for the child elements of common
//! metadata types (profiles, permission sets, objects, labels, flows, layouts
//! and applications), their human-readable labels, and the set of root tags
//! recognized as Salesforce metadata.
//!
//! # Example
//!
//! ```rust
//! use metadiff_dialect_salesforce::parse_salesforce;
//! use metadiff_xml::XmlCompareOptions;
//!
//! let xml = "<Profile><userPermissions><name>ApiEnabled</name></userPermissions></Profile>";
//! let parsed = parse_salesforce(xml, &XmlCompareOptions::default());
//! assert_eq!(parsed.elements[0].display_key, "ApiEnabled");
//! assert_eq!(parsed.elements[0].human_type, "User Permissions");
//! ```

use std::sync::LazyLock;

use metadiff_xml::{
    Dialect, KeyField, ParsedElements, RuleSet, SELF_KEY_SENTINEL, XmlCompareOptions,
    parse_elements,
};

/// Key field spellings follow rule tables: a `|` separates composite parts.
const KEY_FIELDS: &[(&str, &str)] = &[
    // Profile and PermissionSet
    ("fieldPermissions", "field"),
    ("objectPermissions", "object"),
    ("userPermissions", "name"),
    ("tabVisibilities", "tab"),
    ("recordTypeVisibilities", "recordType"),
    ("applicationVisibilities", "application"),
    ("classAccesses", "apexClass"),
    ("pageAccesses", "apexPage"),
    ("layoutAssignments", "layout|recordType"),
    ("customPermissions", "name"),
    ("flowAccesses", "flow"),
    ("customMetadataTypeAccesses", "name"),
    ("customSettingAccesses", "name"),
    ("externalDataSourceAccesses", "externalDataSource"),
    ("loginFlows", "flow"),
    (
        "profileActionOverrides",
        "actionName|pageOrSobjectType|recordType",
    ),
    ("categoryGroupVisibilities", "dataCategoryGroup"),
    ("loginHours", SELF_KEY_SENTINEL),
    ("loginIpRanges", SELF_KEY_SENTINEL),
    // CustomObject
    ("fields", "fullName"),
    ("listViews", "fullName"),
    ("validationRules", "fullName"),
    ("recordTypes", "fullName"),
    ("webLinks", "fullName"),
    ("compactLayouts", "fullName"),
    ("fieldSets", "fullName"),
    ("businessProcesses", "fullName"),
    ("sharingReasons", "fullName"),
    ("indexes", "fullName"),
    // CustomLabels
    ("labels", "fullName"),
    // Flow
    ("actionCalls", "name"),
    ("assignments", "name"),
    ("decisions", "name"),
    ("screens", "name"),
    ("recordLookups", "name"),
    ("recordCreates", "name"),
    ("recordUpdates", "name"),
    ("recordDeletes", "name"),
    ("loops", "name"),
    ("subflows", "name"),
    ("variables", "name"),
    ("constants", "name"),
    ("formulas", "name"),
    ("textTemplates", "name"),
    ("choices", "name"),
    ("dynamicChoiceSets", "name"),
    ("waits", "name"),
    ("collectionProcessors", "name"),
    ("stages", "name"),
    ("steps", "name"),
    // Layout
    ("layoutSections", "label"),
    ("relatedLists", "relatedList"),
    ("platformActionList", SELF_KEY_SENTINEL),
    ("quickActionList", SELF_KEY_SENTINEL),
    // CustomApplication
    ("actionOverrides", "actionName"),
    ("tabs", SELF_KEY_SENTINEL),
];

const LABELS: &[(&str, &str)] = &[
    ("fieldPermissions", "Field Permissions"),
    ("objectPermissions", "Object Permissions"),
    ("userPermissions", "User Permissions"),
    ("tabVisibilities", "Tab Visibilities"),
    ("recordTypeVisibilities", "Record Type Visibilities"),
    ("applicationVisibilities", "App Visibilities"),
    ("classAccesses", "Apex Class Access"),
    ("pageAccesses", "Apex Page Access"),
    ("layoutAssignments", "Layout Assignments"),
    ("customPermissions", "Custom Permissions"),
    ("flowAccesses", "Flow Access"),
    ("customMetadataTypeAccesses", "Custom Metadata Access"),
    ("customSettingAccesses", "Custom Setting Access"),
    ("externalDataSourceAccesses", "External Data Source Access"),
    ("loginFlows", "Login Flows"),
    ("profileActionOverrides", "Action Overrides"),
    ("categoryGroupVisibilities", "Category Group Visibilities"),
    ("loginHours", "Login Hours"),
    ("loginIpRanges", "Login IP Ranges"),
    ("fields", "Fields"),
    ("listViews", "List Views"),
    ("validationRules", "Validation Rules"),
    ("recordTypes", "Record Types"),
    ("webLinks", "Buttons & Links"),
    ("compactLayouts", "Compact Layouts"),
    ("fieldSets", "Field Sets"),
    ("businessProcesses", "Business Processes"),
    ("sharingReasons", "Sharing Reasons"),
    ("indexes", "Indexes"),
    ("labels", "Labels"),
    ("actionCalls", "Action Calls"),
    ("assignments", "Assignments"),
    ("decisions", "Decisions"),
    ("screens", "Screens"),
    ("recordLookups", "Record Lookups"),
    ("recordCreates", "Record Creates"),
    ("recordUpdates", "Record Updates"),
    ("recordDeletes", "Record Deletes"),
    ("loops", "Loops"),
    ("subflows", "Subflows"),
    ("variables", "Variables"),
    ("constants", "Constants"),
    ("formulas", "Formulas"),
    ("textTemplates", "Text Templates"),
    ("choices", "Choices"),
    ("dynamicChoiceSets", "Dynamic Choice Sets"),
    ("waits", "Waits"),
    ("collectionProcessors", "Collection Processors"),
    ("stages", "Stages"),
    ("steps", "Steps"),
    ("layoutSections", "Layout Sections"),
    ("relatedLists", "Related Lists"),
    ("platformActionList", "Platform Actions"),
    ("quickActionList", "Quick Actions"),
    ("actionOverrides", "Action Overrides"),
];

const ROOTS: &[&str] = &[
    "Profile",
    "PermissionSet",
    "CustomObject",
    "CustomField",
    "Layout",
    "Flow",
    "CustomLabels",
    "CustomApplication",
    "CustomTab",
    "ApexClass",
    "ApexTrigger",
    "ApexPage",
    "AuraDefinitionBundle",
    "LightningComponentBundle",
    "MutingPermissionSet",
    "PermissionSetGroup",
];

static RULES: LazyLock<RuleSet> = LazyLock::new(build_rules);

fn build_rules() -> RuleSet {
    let mut rules = RuleSet::new().with_roots(ROOTS.iter().copied());
    for (type_name, spelling) in KEY_FIELDS {
        rules
            .key_fields
            .insert((*type_name).to_string(), key_field_from_spelling(spelling));
    }
    for (type_name, label) in LABELS {
        rules
            .labels
            .insert((*type_name).to_string(), (*label).to_string());
    }
    rules
}

fn key_field_from_spelling(spelling: &str) -> KeyField {
    if spelling == SELF_KEY_SENTINEL {
        KeyField::SelfKeyed
    } else if spelling.contains('|') {
        KeyField::composite(spelling.split('|'))
    } else {
        KeyField::Single(spelling.to_string())
    }
}

/// Dialect implementation for Salesforce metadata API files.
#[derive(Debug, Default, Clone, Copy)]
pub struct SalesforceDialect;

impl SalesforceDialect {
    /// The full rule table, e.g. to layer user rules on top of it.
    pub fn rules(&self) -> &'static RuleSet {
        &RULES
    }
}

impl Dialect for SalesforceDialect {
    fn dialect_name(&self) -> &str {
        "salesforce"
    }

    fn key_field(&self, type_name: &str) -> Option<&KeyField> {
        RULES.key_field(type_name)
    }

    fn human_label(&self, type_name: &str) -> Option<&str> {
        RULES.human_label(type_name)
    }

    fn is_known_root(&self, root_tag: &str) -> bool {
        RULES.is_known_root(root_tag)
    }
}

/// Whether `root_tag` is the root element of a known metadata type.
pub fn is_salesforce_metadata(root_tag: &str) -> bool {
    SalesforceDialect.is_known_root(root_tag)
}

/// Extract top-level elements using [`SalesforceDialect`].
pub fn parse_salesforce(input: &str, options: &XmlCompareOptions) -> ParsedElements {
    parse_elements(input, options, &SalesforceDialect)
}
