use crate::{include_res, markdown};

use super::Email;

pub fn new_request(to: String, student_name: &str, subject: &str, details: &str) -> Email {
    let body = include_res!(str, "/mail/new_request.md")
        .replace("{student_name}", &markdown::escape(student_name))
        .replace("{subject}", &markdown::escape(subject))
        .replace("{details}", &markdown::escape(details));

    Email {
        to,
        subject: "New Student Query - AskBITSians".to_owned(),
        html: markdown::to_html(&body),
    }
}

pub fn request_answered(to: String, accepted: bool, alumnus_name: &str, subject: &str) -> Email {
    let (template, verb) = if accepted {
        (include_res!(str, "/mail/request_accepted.md"), "Accepted")
    } else {
        (include_res!(str, "/mail/request_declined.md"), "Declined")
    };
    let body = template
        .replace("{alumnus_name}", &markdown::escape(alumnus_name))
        .replace("{subject}", &markdown::escape(subject));

    Email {
        to,
        subject: format!("Your Query was {verb} - AskBITSians"),
        html: markdown::to_html(&body),
    }
}
