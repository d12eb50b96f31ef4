use super::node::{optional, required, SchemaNode};

fn string_list() -> SchemaNode {
    SchemaNode::array(SchemaNode::string())
}

fn location() -> SchemaNode {
    SchemaNode::object(vec![
        optional("address", SchemaNode::string()),
        optional("postalCode", SchemaNode::string()),
        optional("city", SchemaNode::string()),
        optional("countryCode", SchemaNode::string()),
        optional("region", SchemaNode::string()),
    ])
}

fn profile() -> SchemaNode {
    SchemaNode::object(vec![
        required("network", SchemaNode::string()),
        required("username", SchemaNode::string()),
        required("url", SchemaNode::uri()),
    ])
}

fn basics() -> SchemaNode {
    SchemaNode::object(vec![
        required("name", SchemaNode::string()),
        optional("label", SchemaNode::string()),
        optional("image", SchemaNode::string()),
        optional("email", SchemaNode::email()),
        optional("phone", SchemaNode::string()),
        optional("url", SchemaNode::uri()),
        optional("summary", SchemaNode::string()),
        optional("location", location()),
        optional("profiles", SchemaNode::array(profile())),
    ])
}

fn work() -> SchemaNode {
    SchemaNode::object(vec![
        required("company", SchemaNode::string()),
        required("position", SchemaNode::string()),
        optional("website", SchemaNode::uri()),
        required("startDate", SchemaNode::string()),
        optional("endDate", SchemaNode::string()),
        optional("summary", SchemaNode::string()),
        optional("highlights", string_list()),
    ])
}

fn volunteer() -> SchemaNode {
    SchemaNode::object(vec![
        required("organization", SchemaNode::string()),
        required("position", SchemaNode::string()),
        optional("url", SchemaNode::uri()),
        required("startDate", SchemaNode::string()),
        optional("endDate", SchemaNode::string()),
        optional("summary", SchemaNode::string()),
        optional("highlights", string_list()),
    ])
}

fn education() -> SchemaNode {
    SchemaNode::object(vec![
        required("institution", SchemaNode::string()),
        optional("url", SchemaNode::uri()),
        optional("area", SchemaNode::string()),
        optional("studyType", SchemaNode::string()),
        required("startDate", SchemaNode::string()),
        optional("endDate", SchemaNode::string()),
        optional("score", SchemaNode::string()),
        optional("courses", string_list()),
    ])
}

fn award() -> SchemaNode {
    SchemaNode::object(vec![
        required("title", SchemaNode::string()),
        required("date", SchemaNode::string()),
        required("awarder", SchemaNode::string()),
        optional("summary", SchemaNode::string()),
    ])
}

fn certificate() -> SchemaNode {
    SchemaNode::object(vec![
        required("name", SchemaNode::string()),
        required("date", SchemaNode::string()),
        required("issuer", SchemaNode::string()),
        optional("url", SchemaNode::uri()),
    ])
}

fn publication() -> SchemaNode {
    SchemaNode::object(vec![
        required("name", SchemaNode::string()),
        required("publisher", SchemaNode::string()),
        required("releaseDate", SchemaNode::string()),
        optional("url", SchemaNode::uri()),
        optional("summary", SchemaNode::string()),
    ])
}

fn skill() -> SchemaNode {
    SchemaNode::object(vec![
        required("name", SchemaNode::string()),
        optional("level", SchemaNode::string()),
        optional("keywords", string_list()),
    ])
}

fn language() -> SchemaNode {
    SchemaNode::object(vec![
        required("language", SchemaNode::string()),
        optional("fluency", SchemaNode::string()),
    ])
}

fn interest() -> SchemaNode {
    SchemaNode::object(vec![
        required("name", SchemaNode::string()),
        optional("keywords", string_list()),
    ])
}

fn reference() -> SchemaNode {
    SchemaNode::object(vec![
        required("name", SchemaNode::string()),
        required("reference", SchemaNode::string()),
    ])
}

fn project() -> SchemaNode {
    SchemaNode::object(vec![
        required("name", SchemaNode::string()),
        required("startDate", SchemaNode::string()),
        optional("endDate", SchemaNode::string()),
        optional("description", SchemaNode::string()),
        optional("highlights", string_list()),
        optional("url", SchemaNode::uri()),
    ])
}

pub(super) fn build() -> SchemaNode {
    SchemaNode::object(vec![
        required("basics", basics()),
        optional("work", SchemaNode::array(work()).titled("Work Experience")),
        optional("volunteer", SchemaNode::array(volunteer())),
        optional("education", SchemaNode::array(education())),
        optional("awards", SchemaNode::array(award())),
        optional("certificates", SchemaNode::array(certificate())),
        optional("publications", SchemaNode::array(publication())),
        optional("skills", SchemaNode::array(skill())),
        optional("languages", SchemaNode::array(language())),
        optional("interests", SchemaNode::array(interest())),
        optional("references", SchemaNode::array(reference())),
        optional("projects", SchemaNode::array(project())),
    ])
}
